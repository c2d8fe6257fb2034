use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("query: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("connection: {0}")]
    Connection(#[from] diesel::ConnectionError),

    #[error("pool: {0}")]
    Pool(String),

    #[error("migration: {0}")]
    Migration(String),

    // Writes that must touch exactly one row are guarded with this; hitting
    // it means the schema no longer matches what the indexer believes.
    #[error("{table}: expected to affect {expected} row(s), affected {actual}")]
    RowCount {
        table: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{table}: no row for {key}")]
    NotFound { table: &'static str, key: String },

    #[error("chain cursor row missing")]
    MissingCursor,
}

/// Maps an affected-row count onto the exactly-one rule.
pub(crate) fn expect_one(table: &'static str, actual: usize) -> Result<(), DbError> {
    if actual != 1 {
        return Err(DbError::RowCount {
            table,
            expected: 1,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expect_one() {
        assert!(expect_one("blocks", 1).is_ok());
        let err = expect_one("blocks", 0).unwrap_err();
        assert!(matches!(
            err,
            DbError::RowCount {
                table: "blocks",
                expected: 1,
                actual: 0,
            }
        ));
        assert!(expect_one("blocks", 2).is_err());
    }
}
