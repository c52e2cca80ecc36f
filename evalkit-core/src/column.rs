use crate::{Expression, OpPrecedence, SqlWriter, TableRef, Value, writer::Context};
use proc_macro2::TokenStream;
use quote::{ToTokens, TokenStreamExt, quote};

/// Fully qualified reference to a table column.
///
/// The derive macro generates one associated constant per field, for example
/// `Student::name`, which is what filters, orderings and update data are built
/// from.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    /// Column name.
    pub name: &'static str,
    /// Table name.
    pub table: &'static str,
    /// Schema name (may be empty).
    pub schema: &'static str,
}

impl ColumnRef {
    pub const fn new(name: &'static str, table: &'static str, schema: &'static str) -> Self {
        Self {
            name,
            table,
            schema,
        }
    }

    pub fn table(&self) -> TableRef {
        TableRef {
            name: self.table,
            schema: self.schema,
            alias: "",
        }
    }
}

/// Indicates how (or if) a column participates in the primary key.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryKeyType {
    /// Single-column primary key.
    PrimaryKey,
    /// Member of a composite primary key.
    PartOfPrimaryKey,
    /// Not part of the primary key.
    #[default]
    None,
}

impl ToTokens for PrimaryKeyType {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        use PrimaryKeyType::*;
        tokens.append_all(match self {
            PrimaryKey => quote!(::evalkit::PrimaryKeyType::PrimaryKey),
            PartOfPrimaryKey => quote!(::evalkit::PrimaryKeyType::PartOfPrimaryKey),
            None => quote!(::evalkit::PrimaryKeyType::None),
        });
    }
}

/// Referential action for foreign key updates / deletes.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    #[default]
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

impl Action {
    /// Parses the attribute spelling: `"cascade"`, `"set null"`, `"restrict"`...
    pub fn from_name(name: &str) -> Option<Action> {
        let name = name.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        Some(match name.as_str() {
            "no action" => Action::NoAction,
            "restrict" => Action::Restrict,
            "cascade" => Action::Cascade,
            "set null" => Action::SetNull,
            "set default" => Action::SetDefault,
            _ => return None,
        })
    }
}

impl ToTokens for Action {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        tokens.append_all(match self {
            Action::NoAction => quote! { ::evalkit::Action::NoAction },
            Action::Restrict => quote! { ::evalkit::Action::Restrict },
            Action::Cascade => quote! { ::evalkit::Action::Cascade },
            Action::SetNull => quote! { ::evalkit::Action::SetNull },
            Action::SetDefault => quote! { ::evalkit::Action::SetDefault },
        });
    }
}

/// Declarative definition of a table column.
#[derive(Default, Debug)]
pub struct ColumnDef {
    /// Column identity.
    pub column_ref: ColumnRef,
    /// Explicit SQL type override (empty => infer from `value`).
    pub column_type: &'static str,
    /// Empty `Value` describing the column type.
    pub value: Value,
    pub nullable: bool,
    /// Raw SQL default expression, for example `CURRENT_TIMESTAMP`.
    pub default: Option<&'static str>,
    pub primary_key: PrimaryKeyType,
    /// Single column unique constraint, composite ones live in `Entity::unique_defs`.
    pub unique: bool,
    pub auto_increment: bool,
    /// Stamped with the current time by every update.
    pub updated_at: bool,
    /// Foreign key target column.
    pub references: Option<ColumnRef>,
    pub on_delete: Option<Action>,
    pub on_update: Option<Action>,
    /// Passive columns are omitted from `INSERT` when the field is `NotSet`.
    pub passive: bool,
}

impl ColumnDef {
    pub fn name(&self) -> &'static str {
        self.column_ref.name
    }
    pub fn table(&self) -> &'static str {
        self.column_ref.table
    }
    pub fn schema(&self) -> &'static str {
        self.column_ref.schema
    }
    pub fn is_primary_key(&self) -> bool {
        self.primary_key != PrimaryKeyType::None
    }
}

impl<'a> From<&'a ColumnDef> for &'a ColumnRef {
    fn from(value: &'a ColumnDef) -> Self {
        &value.column_ref
    }
}

impl OpPrecedence for ColumnRef {
    fn precedence(&self, _writer: &dyn SqlWriter) -> i32 {
        1_000_000
    }
}

impl Expression for ColumnRef {
    fn write_query(&self, writer: &dyn SqlWriter, context: &mut Context, buff: &mut String) {
        writer.write_column_ref(context, buff, self);
    }
}
