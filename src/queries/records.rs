//! Statements shared by the three record collections.
//!
//! Every collection table carries `id`, `saved_at` and `session_tag` columns, so the
//! statements here are generic over the table's `Iden` enum and take the columns explicitly.

use sea_query::{Asterisk, Expr, Iden, Order, Query, SqliteQueryBuilder};

/// SELECT * FROM <table> WHERE id = ?
pub fn select_by_id<T: Iden + Copy + 'static>(table: T, id_col: T, id: &str) -> String {
    Query::select()
        .column(Asterisk)
        .from(table)
        .and_where(Expr::col(id_col).eq(id))
        .to_string(SqliteQueryBuilder)
}

/// SELECT * FROM <table> WHERE <column> = ? ORDER BY saved_at, id
pub fn select_by_text_column<T: Iden + Copy + 'static>(
    table: T,
    column: T,
    value: &str,
    saved_at_col: T,
    id_col: T,
) -> String {
    Query::select()
        .column(Asterisk)
        .from(table)
        .and_where(Expr::col(column).eq(value))
        .order_by(saved_at_col, Order::Asc)
        .order_by(id_col, Order::Asc)
        .to_string(SqliteQueryBuilder)
}

/// SELECT * FROM <table> WHERE saved_at = ? ORDER BY id
pub fn select_by_saved_at<T: Iden + Copy + 'static>(
    table: T,
    saved_at_col: T,
    saved_at_ms: i64,
    id_col: T,
) -> String {
    Query::select()
        .column(Asterisk)
        .from(table)
        .and_where(Expr::col(saved_at_col).eq(saved_at_ms))
        .order_by(id_col, Order::Asc)
        .to_string(SqliteQueryBuilder)
}

/// SELECT * FROM <table> ORDER BY saved_at, id
pub fn select_all<T: Iden + Copy + 'static>(table: T, saved_at_col: T, id_col: T) -> String {
    Query::select()
        .column(Asterisk)
        .from(table)
        .order_by(saved_at_col, Order::Asc)
        .order_by(id_col, Order::Asc)
        .to_string(SqliteQueryBuilder)
}

/// DELETE FROM <table> WHERE id IN (...)
pub fn delete_by_ids<T: Iden + Copy + 'static>(table: T, id_col: T, ids: &[String]) -> String {
    Query::delete()
        .from_table(table)
        .and_where(Expr::col(id_col).is_in(ids.iter().cloned()))
        .to_string(SqliteQueryBuilder)
}

/// DELETE FROM <table> WHERE session_tag = ?
pub fn delete_by_session<T: Iden + Copy + 'static>(
    table: T,
    session_tag_col: T,
    session_tag: &str,
) -> String {
    Query::delete()
        .from_table(table)
        .and_where(Expr::col(session_tag_col).eq(session_tag))
        .to_string(SqliteQueryBuilder)
}

/// DELETE FROM <table> WHERE saved_at < ?
pub fn delete_saved_before<T: Iden + Copy + 'static>(
    table: T,
    saved_at_col: T,
    cutoff_ms: i64,
) -> String {
    Query::delete()
        .from_table(table)
        .and_where(Expr::col(saved_at_col).lt(cutoff_ms))
        .to_string(SqliteQueryBuilder)
}

/// SELECT COUNT(*) FROM <table>
pub fn count_all<T: Iden + Copy + 'static>(table: T) -> String {
    Query::select()
        .expr(Expr::col(Asterisk).count())
        .from(table)
        .to_string(SqliteQueryBuilder)
}
