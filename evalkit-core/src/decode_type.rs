use crate::{Value, matches_path};
use quote::ToTokens;
use syn::{GenericArgument, PathArguments, Type, TypePath, TypeSlice};

/// Column shape recovered from the Rust type of a model field.
#[derive(Clone)]
pub struct TypeDecoded {
    /// Empty value of the column type.
    pub value: Value,
    /// `Option<T>` somewhere in the wrappers.
    pub nullable: bool,
    /// `Passive<T>` somewhere in the wrappers.
    pub passive: bool,
    /// Type left after removing `Option` and `Passive`, used for key arguments.
    pub inner: Type,
}

fn first_generic(path: &syn::Path) -> syn::Result<&Type> {
    let error = || {
        syn::Error::new_spanned(
            path,
            format!("`{}` must have a type argument", path.to_token_stream()),
        )
    };
    let Some(segment) = path.segments.last() else {
        return Err(error());
    };
    let PathArguments::AngleBracketed(bracketed) = &segment.arguments else {
        return Err(error());
    };
    match bracketed.args.first() {
        Some(GenericArgument::Type(ty)) => Ok(ty),
        _ => Err(error()),
    }
}

pub fn decode_type(ty: &Type) -> syn::Result<TypeDecoded> {
    let value = 'data_type: {
        match ty {
            Type::Path(TypePath { path, .. }) => {
                if let Some(ident) = path.get_ident() {
                    let value = match ident.to_string().as_str() {
                        "bool" => Some(Value::Boolean(None)),
                        "i8" => Some(Value::Int8(None)),
                        "i16" => Some(Value::Int16(None)),
                        "i32" => Some(Value::Int32(None)),
                        "i64" => Some(Value::Int64(None)),
                        "u8" => Some(Value::UInt8(None)),
                        "u16" => Some(Value::UInt16(None)),
                        "u32" => Some(Value::UInt32(None)),
                        "u64" => Some(Value::UInt64(None)),
                        "f32" => Some(Value::Float32(None)),
                        "f64" => Some(Value::Float64(None)),
                        _ => None,
                    };
                    if let Some(value) = value {
                        break 'data_type value;
                    }
                }
                if matches_path(path, &["std", "string", "String"]) {
                    break 'data_type Value::Varchar(None);
                } else if matches_path(path, &["time", "Time"]) {
                    break 'data_type Value::Time(None);
                } else if matches_path(path, &["time", "Date"]) {
                    break 'data_type Value::Date(None);
                } else if matches_path(path, &["time", "PrimitiveDateTime"]) {
                    break 'data_type Value::Timestamp(None);
                } else if matches_path(path, &["time", "OffsetDateTime"]) {
                    break 'data_type Value::TimestampWithTimezone(None);
                }
                let is_option = matches_path(path, &["std", "option", "Option"]);
                let is_passive = matches_path(path, &["evalkit", "Passive"]);
                let is_box = matches_path(path, &["std", "boxed", "Box"]);
                let is_vec = matches_path(path, &["std", "vec", "Vec"]);
                if is_option || is_passive {
                    let mut decoded = decode_type(first_generic(path)?)?;
                    decoded.nullable |= is_option;
                    decoded.passive |= is_passive;
                    return Ok(decoded);
                }
                if is_box || is_vec {
                    let element = first_generic(path)?;
                    let element = if is_box {
                        match element {
                            Type::Slice(TypeSlice { elem, .. }) => elem.as_ref(),
                            _ => element,
                        }
                    } else {
                        element
                    };
                    if let Type::Path(TypePath { path, .. }) = element
                        && path.is_ident("u8")
                    {
                        break 'data_type Value::Blob(None);
                    }
                }
                return Err(syn::Error::new_spanned(
                    ty,
                    format!("Unsupported column type `{}`", ty.to_token_stream()),
                ));
            }
            _ => {
                return Err(syn::Error::new_spanned(
                    ty,
                    format!("Unsupported column type `{}`", ty.to_token_stream()),
                ));
            }
        }
    };
    Ok(TypeDecoded {
        value,
        nullable: false,
        passive: false,
        inner: ty.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::decode_type;
    use crate::Value;
    use quote::ToTokens;
    use syn::{Type, parse_str};

    fn decode(ty: &str) -> syn::Result<super::TypeDecoded> {
        decode_type(&parse_str::<Type>(ty).expect("Valid type"))
    }

    #[test]
    fn wrappers() {
        let decoded = decode("Option<Passive<i32>>").expect("Supported");
        assert_eq!(decoded.value, Value::Int32(None));
        assert!(decoded.nullable && decoded.passive);
        assert_eq!(decoded.inner.to_token_stream().to_string(), "i32");

        let decoded = decode("::time::PrimitiveDateTime").expect("Supported");
        assert_eq!(decoded.value, Value::Timestamp(None));
        assert!(!decoded.nullable && !decoded.passive);

        assert_eq!(decode("Box<[u8]>").expect("Supported").value, Value::Blob(None));
        assert!(decode("std::collections::HashMap<i32, i32>").is_err());
        assert!(decode("(i32, i32)").is_err());
    }
}
