use sqlx::SqlitePool;

pub const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

const SCHEMA_VERSION: &str = "1";

/// Executes the schema file statement by statement, in the order it is
/// written (parent tables before tables referencing them). Guarded by a
/// version row so reruns are no-ops.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let version: Option<String> =
        sqlx::query_scalar("SELECT value FROM _db_metadata WHERE key = 'schema_version'")
            .fetch_optional(pool)
            .await
            .unwrap_or(None);

    if version.is_some() {
        return Ok(());
    }

    for stmt in split_sql_statements(SCHEMA_SQL) {
        let sql: String = stmt
            .lines()
            .filter(|line| !line.trim().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        let trimmed = sql.trim();
        if trimmed.is_empty() {
            continue;
        }
        sqlx::query(trimmed).execute(pool).await?;
    }

    sqlx::query("INSERT OR REPLACE INTO _db_metadata (key, value) VALUES ('schema_version', ?)")
        .bind(SCHEMA_VERSION)
        .execute(pool)
        .await?;

    Ok(())
}

/// Splits a multi-statement SQL file on semicolons, honoring string
/// literals.
pub fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_string = false;

    for ch in sql.chars() {
        match ch {
            '\'' => {
                in_string = !in_string;
                current.push(ch);
            }
            ';' if !in_string => {
                let stmt = current.trim();
                if !stmt.is_empty() {
                    statements.push(stmt.to_string());
                }
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    let tail = current.trim();
    if !tail.is_empty() {
        statements.push(tail.to_string());
    }

    statements
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_statement_boundaries() {
        let stmts = split_sql_statements("CREATE TABLE a (x);\nCREATE TABLE b (y);\n");
        assert_eq!(stmts, vec!["CREATE TABLE a (x)", "CREATE TABLE b (y)"]);
    }

    #[test]
    fn semicolons_inside_string_literals_are_preserved() {
        let stmts = split_sql_statements("INSERT INTO a VALUES ('x;y'); SELECT 1");
        assert_eq!(stmts, vec!["INSERT INTO a VALUES ('x;y')", "SELECT 1"]);
    }

    #[test]
    fn schema_file_defines_all_tables_in_dependency_order() {
        let tables: Vec<&str> = SCHEMA_SQL
            .lines()
            .filter_map(|line| line.trim().strip_prefix("CREATE TABLE IF NOT EXISTS "))
            .filter_map(|rest| rest.split_whitespace().next())
            .collect();

        assert_eq!(
            tables,
            vec![
                "words",
                "groups",
                "study_activities",
                "word_groups",
                "study_sessions",
                "word_review_items",
                "_db_metadata",
            ]
        );
    }
}
