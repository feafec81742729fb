pub mod authority;
pub mod customer;
pub mod menu;
pub mod revocation;
pub mod user;

use diesel::dsl::{AsSelect, SqlTypeOf};
use diesel::pg::Pg;

/// SQL type produced by selecting `T` through `T::as_select()`.
pub(crate) type Selection<T> = SqlTypeOf<AsSelect<T, Pg>>;
