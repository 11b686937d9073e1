//! sea-orm adapters for the repository ports.

mod analytics;
mod booking;
mod comment;
mod provider;
mod service;
mod user;
mod wishlist;

pub use analytics::DbAnalyticsRepository;
pub use booking::DbBookingRepository;
pub use comment::DbCommentRepository;
pub use provider::DbProviderProfileRepository;
pub use service::DbServiceOfferingRepository;
pub use user::DbUserRepository;
pub use wishlist::DbWishlistRepository;

use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{ColumnTrait, DbErr, SqlErr};

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn to_json_list(values: &[String]) -> serde_json::Value {
    serde_json::Value::from(values.to_vec())
}

fn from_json_list(value: serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// `%needle%` for a case-insensitive `LIKE` against a lowercased column.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .trim()
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Case-insensitive substring match on a text column.
fn lower_contains<C: ColumnTrait>(column: C, needle: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column)))
        .like(LikeExpr::new(like_pattern(needle)).escape('\\'))
}
