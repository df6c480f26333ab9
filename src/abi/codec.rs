//! Runtime-typed ABI encoding.
//!
//! Signatures are parsed into [`AbiType`]s here; the head/tail layout comes
//! from `alloy-dyn-abi`. Values are range-checked before encoding and head
//! words are checked before decoding, since the dynamic codec writes whatever
//! it is given and masks dirty bits on the way back.

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Bytes, B256, U256};

use super::errors::AbiError;
use super::helpers::{decode_u256, is_clean_address};
use super::selectors::Selector;
use super::types::{AbiType, AbiValue, FunctionSignature};
use crate::constants::WORD_SIZE;

/// Encode `args` for `signature` and prefix the selector.
pub fn encode_call(signature: &str, args: &[AbiValue]) -> Result<Bytes, AbiError> {
    let sig = FunctionSignature::parse(signature)?;
    encode_with_selector(sig.selector(), &sig.inputs, args)
}

/// Encode `args` against already-parsed parameter types behind a known selector.
pub fn encode_with_selector(
    selector: Selector,
    types: &[AbiType],
    args: &[AbiValue],
) -> Result<Bytes, AbiError> {
    check_arguments(types, args)?;
    let body = encode_params(args)?;
    let mut out = Vec::with_capacity(selector.len() + body.len());
    out.extend_from_slice(&selector);
    out.extend_from_slice(&body);
    Ok(out.into())
}

/// Encode return values (no selector).
pub fn encode_result(values: &[AbiValue]) -> Result<Bytes, AbiError> {
    encode_params(values).map(Bytes::from)
}

/// Decode a single declared return value.
///
/// A static type must be exactly one word. A dynamic type must be an offset
/// word followed by a tail that stays inside the buffer.
pub fn decode_return(ty: AbiType, data: &[u8]) -> Result<AbiValue, AbiError> {
    let malformed = |expected| AbiError::MalformedOutput {
        ty,
        expected,
        got: data.len(),
    };
    if !ty.is_dynamic() && data.len() != WORD_SIZE {
        return Err(malformed(WORD_SIZE));
    }
    if ty.is_dynamic() && data.len() < 2 * WORD_SIZE {
        return Err(malformed(2 * WORD_SIZE));
    }

    let mut values = decode(&[ty], data).map_err(|err| match err {
        AbiError::Decode(_) => malformed(claimed_len(data)),
        other => other,
    })?;
    values.pop().ok_or_else(|| malformed(WORD_SIZE))
}

/// Decode a sequence of values laid out head/tail.
///
/// Trailing bytes past the last tail are ignored, matching how contracts
/// read their calldata.
pub fn decode(types: &[AbiType], data: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
    let head_len = types.len() * WORD_SIZE;
    if data.len() < head_len {
        return Err(AbiError::Truncated {
            needed: head_len,
            available: data.len(),
        });
    }
    for (ty, word) in types.iter().zip(data.chunks_exact(WORD_SIZE)) {
        if !ty.is_dynamic() {
            check_word(*ty, B256::from_slice(word))?;
        }
    }

    let tuple = DynSolType::Tuple(types.iter().copied().map(DynSolType::from).collect());
    match tuple
        .abi_decode_params(data)
        .map_err(|err| AbiError::Decode(err.to_string()))?
    {
        DynSolValue::Tuple(values) => values.into_iter().map(AbiValue::try_from).collect(),
        other => Err(AbiError::UnsupportedType(format!("{other:?}"))),
    }
}

fn check_arguments(types: &[AbiType], args: &[AbiValue]) -> Result<(), AbiError> {
    if types.len() != args.len() {
        return Err(AbiError::ArgumentCountMismatch {
            expected: types.len(),
            got: args.len(),
        });
    }
    for (index, (expected, arg)) in types.iter().zip(args).enumerate() {
        let got = arg.abi_type();
        if got != *expected {
            return Err(AbiError::TypeMismatch {
                index,
                expected: *expected,
                got,
            });
        }
    }
    Ok(())
}

fn encode_params(values: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
    for value in values {
        check_value(value)?;
    }
    let tuple = DynSolValue::Tuple(values.iter().cloned().map(DynSolValue::from).collect());
    Ok(tuple.abi_encode_params())
}

fn check_value(value: &AbiValue) -> Result<(), AbiError> {
    let in_range = match value {
        AbiValue::Uint(v, bits) => fits_bits(*v, *bits),
        AbiValue::FixedBytes(word, size) => word[*size..].iter().all(|b| *b == 0),
        _ => true,
    };
    if !in_range {
        return Err(AbiError::ValueOutOfRange {
            ty: value.abi_type(),
        });
    }
    Ok(())
}

/// Reject head words with dirty high bits, or a bool other than 0/1.
fn check_word(ty: AbiType, word: B256) -> Result<(), AbiError> {
    let clean = match ty {
        AbiType::Uint(bits) => fits_bits(decode_u256(word), bits),
        AbiType::Address => is_clean_address(word),
        AbiType::Bool => decode_u256(word) <= U256::from(1),
        AbiType::FixedBytes(size) => word[size..].iter().all(|b| *b == 0),
        AbiType::Bytes | AbiType::String => true,
    };
    if !clean {
        return Err(AbiError::ValueOutOfRange { ty });
    }
    Ok(())
}

fn fits_bits(value: U256, bits: usize) -> bool {
    bits >= 256 || value >> bits == U256::ZERO
}

/// Length a single dynamic value's offset and length words claim.
fn claimed_len(data: &[u8]) -> usize {
    let word_at = |at: usize| {
        at.checked_add(WORD_SIZE)
            .and_then(|end| data.get(at..end))
            .and_then(|word| usize::try_from(U256::from_be_slice(word)).ok())
    };
    let Some(offset) = word_at(0) else {
        return usize::MAX;
    };
    let len = word_at(offset).unwrap_or(0);
    offset.saturating_add(WORD_SIZE).saturating_add(len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::helpers::{decode_address, encode_address, encode_u64};
    use crate::abi::selectors;
    use alloy_primitives::{address, Address};
    use proptest::prelude::*;

    #[test]
    fn test_encode_set_call() {
        let data = encode_call("set(uint256)", &[AbiValue::uint256(20u64)]).unwrap();
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(&data[..4], &selectors::set());
        assert_eq!(data[35], 20);
        assert!(data[4..35].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_encode_no_args() {
        let data = encode_call("get()", &[]).unwrap();
        assert_eq!(&data[..], &selectors::get());
    }

    #[test]
    fn test_encode_dynamic_layout() {
        let target = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
        let payload = Bytes::from(vec![0xaa; 33]);
        let data = encode_call(
            "upgradeToAndCall(address,bytes)",
            &[target.into(), payload.clone().into()],
        )
        .unwrap();

        let body = &data[4..];
        // head: address, offset(64); tail: len(33), 64 bytes of padded payload
        assert_eq!(body.len(), 32 * 2 + 32 + 64);
        assert_eq!(decode_address(B256::from_slice(&body[..32])), target);
        assert_eq!(decode_u256(B256::from_slice(&body[32..64])), U256::from(64));
        assert_eq!(decode_u256(B256::from_slice(&body[64..96])), U256::from(33));
        assert_eq!(&body[96..129], &payload[..]);
        assert!(body[129..].iter().all(|b| *b == 0));

        let values = decode(&[AbiType::Address, AbiType::Bytes], body).unwrap();
        assert_eq!(values, vec![AbiValue::Address(target), AbiValue::Bytes(payload)]);
    }

    #[test]
    fn test_encode_argument_errors() {
        assert_eq!(
            encode_call("set(uint256)", &[]),
            Err(AbiError::ArgumentCountMismatch {
                expected: 1,
                got: 0
            })
        );
        assert_eq!(
            encode_call("set(uint256)", &[AbiValue::Bool(true)]),
            Err(AbiError::TypeMismatch {
                index: 0,
                expected: AbiType::Uint(256),
                got: AbiType::Bool
            })
        );
        assert_eq!(
            encode_call("f(uint8)", &[AbiValue::Uint(U256::from(256), 8)]),
            Err(AbiError::ValueOutOfRange {
                ty: AbiType::Uint(8)
            })
        );
    }

    #[test]
    fn test_uint256_round_trip_edges() {
        for n in [U256::ZERO, U256::from(1), U256::from(u64::MAX), U256::MAX] {
            let encoded = encode_result(&[AbiValue::uint256(n)]).unwrap();
            let decoded = decode_return(AbiType::Uint(256), &encoded).unwrap();
            assert_eq!(decoded.as_uint(), Some(n));
        }
    }

    proptest! {
        #[test]
        fn test_uint256_round_trip_any_value(limbs in any::<[u64; 4]>()) {
            let n = U256::from_limbs(limbs);
            let encoded = encode_result(&[AbiValue::uint256(n)]).unwrap();
            prop_assert_eq!(encoded.len(), WORD_SIZE);
            prop_assert_eq!(&encoded[..], &n.to_be_bytes::<32>()[..]);
            let decoded = decode_return(AbiType::Uint(256), &encoded).unwrap();
            prop_assert_eq!(decoded.as_uint(), Some(n));
        }

        #[test]
        fn test_set_call_round_trip_any_value(limbs in any::<[u64; 4]>()) {
            let n = U256::from_limbs(limbs);
            let data = encode_call("set(uint256)", &[AbiValue::uint256(n)]).unwrap();
            prop_assert_eq!(&data[..4], &selectors::set()[..]);
            let args = decode(&[AbiType::Uint(256)], &data[4..]).unwrap();
            prop_assert_eq!(args, vec![AbiValue::uint256(n)]);
        }
    }

    #[test]
    fn test_decode_return_wrong_length_is_malformed() {
        for len in [0usize, 31, 33, 64] {
            let data = vec![0u8; len];
            assert_eq!(
                decode_return(AbiType::Uint(256), &data),
                Err(AbiError::MalformedOutput {
                    ty: AbiType::Uint(256),
                    expected: 32,
                    got: len
                })
            );
        }
    }

    #[test]
    fn test_decode_return_dynamic_out_of_bounds() {
        // offset 32, length 100, but nothing behind it
        let mut data = encode_u64(32).to_vec();
        data.extend_from_slice(encode_u64(100).as_slice());
        assert!(matches!(
            decode_return(AbiType::Bytes, &data),
            Err(AbiError::MalformedOutput { .. })
        ));

        let ok = encode_result(&["hello".into()]).unwrap();
        assert_eq!(
            decode_return(AbiType::String, &ok).unwrap().as_str(),
            Some("hello")
        );
    }

    #[test]
    fn test_decode_rejects_dirty_words() {
        let mut dirty = encode_address(Address::repeat_byte(1));
        dirty.0[0] = 1;
        assert_eq!(
            decode(&[AbiType::Address], dirty.as_slice()),
            Err(AbiError::ValueOutOfRange {
                ty: AbiType::Address
            })
        );

        let two = encode_u64(2);
        assert_eq!(
            decode(&[AbiType::Bool], two.as_slice()),
            Err(AbiError::ValueOutOfRange { ty: AbiType::Bool })
        );

        let big = encode_u64(300);
        assert_eq!(
            decode(&[AbiType::Uint(8)], big.as_slice()),
            Err(AbiError::ValueOutOfRange {
                ty: AbiType::Uint(8)
            })
        );
    }

    #[test]
    fn test_decode_truncated_head() {
        assert_eq!(
            decode(&[AbiType::Uint(256)], &[0u8; 10]),
            Err(AbiError::Truncated {
                needed: 32,
                available: 10
            })
        );
    }

    #[test]
    fn test_fixed_bytes_left_aligned() {
        let mut word = B256::ZERO;
        word.0[..4].copy_from_slice(&[1, 2, 3, 4]);
        let encoded = encode_result(&[AbiValue::FixedBytes(word, 4)]).unwrap();
        assert_eq!(&encoded[..4], &[1, 2, 3, 4]);
        assert_eq!(
            decode_return(AbiType::FixedBytes(4), &encoded).unwrap(),
            AbiValue::FixedBytes(word, 4)
        );

        word.0[10] = 9;
        assert!(encode_result(&[AbiValue::FixedBytes(word, 4)]).is_err());
    }
}
