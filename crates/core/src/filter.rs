//! Listing filters: turns a loose list query into a structured [`Predicate`].
//!
//! A predicate is a conjunction of clauses. The only disjunction is the
//! free-text search, which matches when *any* of the kind's search fields
//! contains the term. Matching is case-insensitive in every backend.
//!
//! Stores either render the predicate to SQL (see `backoffice_db::repositories`) or
//! evaluate it directly through [`Searchable`].

use crate::types::{DbId, EntityKind};

/// A logical field of a listable entity. Stores map these to columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Phone,
    Email,
    /// The sequential code (`memberNumber` / `employeeNumber`).
    Code,
    /// E-mail of the login account owning the entity.
    AccountEmail,
    BranchId,
    Status,
}

const MEMBER_SEARCH_FIELDS: &[Field] = &[Field::Name, Field::Phone, Field::Email, Field::Code];

const EMPLOYEE_SEARCH_FIELDS: &[Field] =
    &[Field::Name, Field::Phone, Field::Code, Field::AccountEmail];

/// Fields searched by the free-text term for a given kind.
pub fn search_fields(kind: EntityKind) -> &'static [Field] {
    match kind {
        EntityKind::Member => MEMBER_SEARCH_FIELDS,
        EntityKind::Employee => EMPLOYEE_SEARCH_FIELDS,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// Case-insensitive substring match on any of `fields`.
    AnyContains { fields: Vec<Field>, needle: String },
    /// Exact match on an id-valued field.
    EqualsId { field: Field, value: DbId },
    /// Exact match on a text-valued field.
    EqualsText { field: Field, value: String },
}

/// Conjunction of [`Clause`]s. An empty predicate matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

/// Read access to an entity's fields for in-process predicate evaluation.
pub trait Searchable {
    /// Text value of `field`, or `None` if absent / not applicable.
    fn text_field(&self, field: Field) -> Option<&str>;

    /// Id value of `field`, or `None` if not applicable.
    fn id_field(&self, field: Field) -> Option<DbId>;
}

impl Predicate {
    /// The predicate that matches every entity.
    pub fn match_all() -> Self {
        Self::default()
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_match_all(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches<T: Searchable + ?Sized>(&self, item: &T) -> bool {
        self.clauses.iter().all(|clause| match clause {
            Clause::AnyContains { fields, needle } => {
                let needle = needle.to_lowercase();
                fields.iter().any(|f| {
                    item.text_field(*f)
                        .is_some_and(|hay| hay.to_lowercase().contains(&needle))
                })
            }
            Clause::EqualsId { field, value } => item.id_field(*field) == Some(*value),
            Clause::EqualsText { field, value } => item.text_field(*field) == Some(value.as_str()),
        })
    }
}

/// Loose filter input for a list query. `status` is only honoured for
/// employees and is expected to be a valid status string already.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub search: Option<String>,
    pub branch_id: Option<DbId>,
    pub status: Option<String>,
}

/// Build the predicate for listing entities of `kind`.
pub fn build(kind: EntityKind, filter: &ListFilter) -> Predicate {
    let mut clauses = Vec::new();

    if let Some(term) = filter.search.as_deref().map(str::trim) {
        if !term.is_empty() {
            clauses.push(Clause::AnyContains {
                fields: search_fields(kind).to_vec(),
                needle: term.to_string(),
            });
        }
    }

    if let Some(branch_id) = filter.branch_id {
        clauses.push(Clause::EqualsId {
            field: Field::BranchId,
            value: branch_id,
        });
    }

    if kind == EntityKind::Employee {
        if let Some(status) = filter.status.as_deref().filter(|s| !s.is_empty()) {
            clauses.push(Clause::EqualsText {
                field: Field::Status,
                value: status.to_string(),
            });
        }
    }

    Predicate { clauses }
}

/// Escape `\`, `%` and `_` so a user term is matched literally by `LIKE`.
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
