use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{ruint::UintTryFrom, Address, Bytes, B256, U256};
use std::fmt;

use super::errors::AbiError;
use super::selectors::{function_selector, Selector};

/// ABI parameter types understood by the encoder.
///
/// Tuples and arrays are not supported; the proxy's ABI only needs
/// elementary types and `bytes` for forwarded setup calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbiType {
    /// `uint<bits>`, 8..=256 in steps of 8
    Uint(usize),
    /// `address`
    Address,
    /// `bool`
    Bool,
    /// `bytes<size>`, 1..=32
    FixedBytes(usize),
    /// `bytes` (dynamic)
    Bytes,
    /// `string` (dynamic)
    String,
}

impl AbiType {
    /// Parse a canonical or shorthand type name (`uint` is `uint256`).
    pub fn parse(name: &str) -> Result<Self, AbiError> {
        let name = name.trim();
        let unsupported = || AbiError::UnsupportedType(name.to_string());
        match name {
            "address" => Ok(Self::Address),
            "bool" => Ok(Self::Bool),
            "bytes" => Ok(Self::Bytes),
            "string" => Ok(Self::String),
            "uint" => Ok(Self::Uint(256)),
            _ => {
                if let Some(bits) = name.strip_prefix("uint") {
                    let bits = parse_size(bits).ok_or_else(unsupported)?;
                    if bits == 0 || bits > 256 || bits % 8 != 0 {
                        return Err(unsupported());
                    }
                    Ok(Self::Uint(bits))
                } else if let Some(size) = name.strip_prefix("bytes") {
                    let size = parse_size(size).ok_or_else(unsupported)?;
                    if size == 0 || size > 32 {
                        return Err(unsupported());
                    }
                    Ok(Self::FixedBytes(size))
                } else {
                    Err(unsupported())
                }
            }
        }
    }

    /// Whether the value lives in the tail of an encoding (behind an offset word).
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::Bytes | Self::String)
    }
}

/// Parse a decimal size suffix, rejecting leading zeros (`uint08`).
fn parse_size(s: &str) -> Option<usize> {
    if s.is_empty() || (s.len() > 1 && s.starts_with('0')) || !s.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    s.parse().ok()
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint(bits) => write!(f, "uint{bits}"),
            Self::Address => f.write_str("address"),
            Self::Bool => f.write_str("bool"),
            Self::FixedBytes(size) => write!(f, "bytes{size}"),
            Self::Bytes => f.write_str("bytes"),
            Self::String => f.write_str("string"),
        }
    }
}

/// A typed ABI value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    /// Unsigned integer together with its declared bit width
    Uint(U256, usize),
    /// 20-byte address
    Address(Address),
    /// Boolean
    Bool(bool),
    /// Fixed-size byte string, left-aligned in the word, with its declared size
    FixedBytes(B256, usize),
    /// Dynamic byte string
    Bytes(Bytes),
    /// Dynamic UTF-8 string
    String(String),
}

impl AbiValue {
    /// A `uint256` value from any primitive integer or `U256`.
    pub fn uint256<T>(value: T) -> Self
    where
        U256: UintTryFrom<T>,
    {
        Self::Uint(U256::from(value), 256)
    }

    /// The ABI type this value encodes as.
    pub fn abi_type(&self) -> AbiType {
        match self {
            Self::Uint(_, bits) => AbiType::Uint(*bits),
            Self::Address(_) => AbiType::Address,
            Self::Bool(_) => AbiType::Bool,
            Self::FixedBytes(_, size) => AbiType::FixedBytes(*size),
            Self::Bytes(_) => AbiType::Bytes,
            Self::String(_) => AbiType::String,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            Self::Uint(v, _) => Some(*v),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            Self::Address(a) => Some(*a),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<U256> for AbiValue {
    fn from(value: U256) -> Self {
        Self::uint256(value)
    }
}

impl From<u64> for AbiValue {
    fn from(value: u64) -> Self {
        Self::Uint(U256::from(value), 256)
    }
}

impl From<Address> for AbiValue {
    fn from(value: Address) -> Self {
        Self::Address(value)
    }
}

impl From<bool> for AbiValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Bytes> for AbiValue {
    fn from(value: Bytes) -> Self {
        Self::Bytes(value)
    }
}

impl From<&str> for AbiValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<AbiType> for DynSolType {
    fn from(ty: AbiType) -> Self {
        match ty {
            AbiType::Uint(bits) => Self::Uint(bits),
            AbiType::Address => Self::Address,
            AbiType::Bool => Self::Bool,
            AbiType::FixedBytes(size) => Self::FixedBytes(size),
            AbiType::Bytes => Self::Bytes,
            AbiType::String => Self::String,
        }
    }
}

impl From<AbiValue> for DynSolValue {
    fn from(value: AbiValue) -> Self {
        match value {
            AbiValue::Uint(v, bits) => Self::Uint(v, bits),
            AbiValue::Address(addr) => Self::Address(addr),
            AbiValue::Bool(b) => Self::Bool(b),
            AbiValue::FixedBytes(word, size) => Self::FixedBytes(word, size),
            AbiValue::Bytes(bytes) => Self::Bytes(bytes.to_vec()),
            AbiValue::String(s) => Self::String(s),
        }
    }
}

impl TryFrom<DynSolValue> for AbiValue {
    type Error = AbiError;

    fn try_from(value: DynSolValue) -> Result<Self, AbiError> {
        match value {
            DynSolValue::Uint(v, bits) => Ok(Self::Uint(v, bits)),
            DynSolValue::Address(addr) => Ok(Self::Address(addr)),
            DynSolValue::Bool(b) => Ok(Self::Bool(b)),
            DynSolValue::FixedBytes(word, size) => Ok(Self::FixedBytes(word, size)),
            DynSolValue::Bytes(bytes) => Ok(Self::Bytes(bytes.into())),
            DynSolValue::String(s) => Ok(Self::String(s)),
            other => Err(AbiError::UnsupportedType(format!("{other:?}"))),
        }
    }
}

/// A parsed function signature such as `set(uint256)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    /// Function name
    pub name: String,
    /// Parameter types in declaration order
    pub inputs: Vec<AbiType>,
}

impl FunctionSignature {
    /// Parse `name(type,...)`. Whitespace around types is ignored.
    pub fn parse(signature: &str) -> Result<Self, AbiError> {
        let signature = signature.trim();
        let invalid = || AbiError::InvalidSignature(signature.to_string());

        let open = signature.find('(').ok_or_else(invalid)?;
        if !signature.ends_with(')') {
            return Err(invalid());
        }

        let name = &signature[..open];
        let valid_name = name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
        if !valid_name {
            return Err(invalid());
        }

        let params = &signature[open + 1..signature.len() - 1];
        if params.contains(['(', ')', '[', ']']) {
            return Err(AbiError::UnsupportedType(params.to_string()));
        }

        let inputs = if params.trim().is_empty() {
            Vec::new()
        } else {
            params
                .split(',')
                .map(AbiType::parse)
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(Self {
            name: name.to_string(),
            inputs,
        })
    }

    /// Canonical form used for selector hashing (`set(uint)` → `set(uint256)`).
    pub fn canonical(&self) -> String {
        let params: Vec<String> = self.inputs.iter().map(ToString::to_string).collect();
        format!("{}({})", self.name, params.join(","))
    }

    /// Selector of the canonical form.
    pub fn selector(&self) -> Selector {
        function_selector(&self.canonical())
    }
}
