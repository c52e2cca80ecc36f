use convert_case::{Case, Casing};
use evalkit_core::{Action, PrimaryKeyType, TypeDecoded, Value, decode_type};
use syn::{Error, Field, Ident, LitStr, Path, Result, Type, meta::ParseNestedMeta};

pub(crate) struct ColumnMetadata {
    pub(crate) ident: Ident,
    pub(crate) ty: Type,
    /// Type without `Option` and `Passive`.
    pub(crate) inner: Type,
    pub(crate) name: String,
    pub(crate) column_type: String,
    pub(crate) value: Value,
    pub(crate) nullable: bool,
    pub(crate) default: Option<String>,
    pub(crate) primary_key: PrimaryKeyType,
    pub(crate) unique: bool,
    pub(crate) auto_increment: bool,
    pub(crate) updated_at: bool,
    pub(crate) references: Option<Path>,
    pub(crate) on_delete: Option<Action>,
    pub(crate) on_update: Option<Action>,
    pub(crate) passive: bool,
}

fn decode_action(arg: &ParseNestedMeta) -> Result<Action> {
    let value: LitStr = arg.value()?.parse()?;
    Action::from_name(&value.value()).ok_or_else(|| {
        Error::new(
            value.span(),
            "Unknown referential action, expected one of `cascade`, `restrict`, `set null`, `set default`, `no action`",
        )
    })
}

pub(crate) fn decode_column(field: &Field) -> Result<ColumnMetadata> {
    let Some(ident) = field.ident.clone() else {
        return Err(Error::new_spanned(field, "Entity fields must be named"));
    };
    let TypeDecoded {
        value,
        nullable,
        passive,
        inner,
    } = decode_type(&field.ty)?;
    let mut name = ident.to_string();
    if name.starts_with('_') {
        name.remove(0);
    }
    let mut metadata = ColumnMetadata {
        ident,
        ty: field.ty.clone(),
        inner,
        name: name.to_case(Case::Camel),
        column_type: String::new(),
        value,
        nullable,
        default: None,
        primary_key: PrimaryKeyType::None,
        unique: false,
        auto_increment: false,
        updated_at: false,
        references: None,
        on_delete: None,
        on_update: None,
        passive,
    };
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("evalkit")) {
        attr.parse_nested_meta(|arg| {
            if arg.path.is_ident("name") {
                metadata.name = arg.value()?.parse::<LitStr>()?.value();
            } else if arg.path.is_ident("type") {
                metadata.column_type = arg.value()?.parse::<LitStr>()?.value();
            } else if arg.path.is_ident("default") {
                metadata.default = Some(arg.value()?.parse::<LitStr>()?.value());
            } else if arg.path.is_ident("primary_key") {
                metadata.primary_key = PrimaryKeyType::PrimaryKey;
                metadata.nullable = false;
            } else if arg.path.is_ident("unique") {
                metadata.unique = true;
            } else if arg.path.is_ident("auto_increment") {
                metadata.auto_increment = true;
            } else if arg.path.is_ident("updated_at") {
                metadata.updated_at = true;
            } else if arg.path.is_ident("references") {
                metadata.references = Some(arg.value()?.parse::<Path>()?);
            } else if arg.path.is_ident("on_delete") {
                metadata.on_delete = Some(decode_action(&arg)?);
            } else if arg.path.is_ident("on_update") {
                metadata.on_update = Some(decode_action(&arg)?);
            } else {
                return Err(arg.error("Unknown `evalkit` column attribute"));
            }
            Ok(())
        })?;
    }
    if metadata.references.is_none()
        && (metadata.on_delete.is_some() || metadata.on_update.is_some())
    {
        return Err(Error::new_spanned(
            field,
            "`on_delete` and `on_update` require `references = Model::field`",
        ));
    }
    if metadata.updated_at
        && !matches!(
            metadata.value,
            Value::Timestamp(..) | Value::TimestampWithTimezone(..)
        )
    {
        return Err(Error::new_spanned(
            &field.ty,
            "`updated_at` requires a `PrimitiveDateTime` or `OffsetDateTime` field",
        ));
    }
    Ok(metadata)
}
