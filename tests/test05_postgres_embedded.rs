#![cfg(feature = "test-utils")]

use sql_orm_adapter::prelude::*;
use sql_orm_adapter::test_utils::postgres::{setup_postgres_embedded, stop_postgres_embedded};

#[test]
fn test05_postgres_gallery_lifecycle() -> Result<(), Box<dyn std::error::Error>> {
    let pg = setup_postgres_embedded("test_db")?;
    // Use the config returned by the embedded helper (has the real user/pass/port)
    let real_cfg = pg.config.clone();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let adapter = PostgresAdapter::new(real_cfg);
        assert!(!adapter.connected());

        adapter
            .query(
                "CREATE TABLE gallery (
                    id SERIAL PRIMARY KEY,
                    title VARCHAR(255) DEFAULT 'untitled',
                    published BOOLEAN NOT NULL DEFAULT true,
                    price NUMERIC(10, 2) DEFAULT 0.00,
                    created TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                    tags TEXT[]
                )",
            )
            .await?;
        assert!(adapter.connected());

        let sources = adapter.sources().await?;
        assert!(sources.contains_key("gallery"));

        let fields = adapter.describe("gallery", None).await?;
        let published = fields.iter().find(|f| f.name == "published").unwrap();
        assert_eq!(published.type_name, "boolean");
        assert_eq!(published.default, Some(Value::Bool(true)));
        assert!(!published.null);
        let title = fields.iter().find(|f| f.name == "title").unwrap();
        assert_eq!(title.default, Some(Value::Text("untitled".into())));
        assert!(title.null);
        let price = fields.iter().find(|f| f.name == "price").unwrap();
        assert_eq!((price.length, price.precision), (Some(10), Some(2)));
        assert_eq!(fields.iter().find(|f| f.name == "created").unwrap().default, None);
        assert!(fields.iter().find(|f| f.name == "tags").unwrap().array);

        let title_literal = adapter.to_storage(&"string".into(), &Value::Text("O'Keeffe".into()));
        let outcome = adapter
            .query(&format!("INSERT INTO gallery (title) VALUES ({title_literal})"))
            .await?;
        assert!(outcome.is_success());
        let id = adapter.last_insert_id().unwrap();
        assert!(!id.is_empty());

        let mut cursor = adapter
            .query(&format!("SELECT id, title, published FROM gallery WHERE id = {id}"))
            .await?
            .into_cursor()
            .unwrap();
        let row = cursor.next().unwrap();
        assert_eq!(row.get("id").and_then(Value::to_plain_string), Some(id.clone()));
        assert_eq!(row.get("title"), Some(&Value::Text("O'Keeffe".into())));
        // Columns arrive as engine text and are typed through the conversion table.
        assert_eq!(row.get("published"), Some(&Value::Text("t".into())));
        let published = row.get("published").cloned().unwrap();
        assert_eq!(
            adapter.convert(Direction::ToApplication, "boolean", published),
            Value::Bool(true)
        );
        assert!(!cursor.valid());

        let outcome = adapter.query(&format!("DELETE FROM gallery WHERE id = {id}")).await?;
        assert!(outcome.is_success());
        let cursor = adapter
            .query(&format!("SELECT * FROM gallery WHERE id = {id}"))
            .await?
            .into_cursor()
            .unwrap();
        assert!(!cursor.valid());

        adapter
            .query(
                "CREATE TABLE measurements (
                    amount NUMERIC(10, 2),
                    taken TIMESTAMP,
                    span INTERVAL,
                    origin INET,
                    wide NUMERIC(38, 10)
                )",
            )
            .await?;
        let wide_spec = TypeSpec::new("decimal").with_length(38).with_precision(10);
        let wide_literal = adapter.to_storage(
            &wide_spec,
            &Value::Text("1234567890123456789012345678.5".into()),
        );
        assert_eq!(wide_literal, "1234567890123456789012345678.5000000000");
        adapter
            .query(&format!(
                "INSERT INTO measurements VALUES
                    (12.5, '2024-03-01 10:30:00', '1 day', '10.0.0.1', {wide_literal})"
            ))
            .await?;
        let mut cursor = adapter
            .query("SELECT * FROM measurements")
            .await?
            .into_cursor()
            .unwrap();
        let row = cursor.next().unwrap();
        assert_eq!(row.get("amount"), Some(&Value::Text("12.50".into())));
        assert_eq!(row.get("taken"), Some(&Value::Text("2024-03-01 10:30:00".into())));
        assert_eq!(row.get("span"), Some(&Value::Text("1 day".into())));
        assert_eq!(row.get("origin"), Some(&Value::Text("10.0.0.1".into())));
        assert_eq!(row.get("wide"), Some(&Value::Text(wide_literal.clone())));

        let amount = row.get("amount").cloned().unwrap();
        assert_eq!(
            adapter.convert(Direction::ToApplication, "decimal", amount),
            Value::Text("12.50".into())
        );
        let taken = row.get("taken").cloned().unwrap();
        let expected = chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(10, 30, 0))
            .unwrap();
        match adapter.convert(Direction::ToApplication, "datetime", taken) {
            Value::TimestampTz(ts) => assert_eq!(ts.naive_local(), expected),
            other => panic!("expected a timestamp, got {other:?}"),
        }

        let mut cursor = adapter
            .query("SELECT 'NaN'::numeric AS n, 123456789012345678901234567890.5::numeric AS big")
            .await?
            .into_cursor()
            .unwrap();
        let row = cursor.next().unwrap();
        assert_eq!(row.get("n"), Some(&Value::Text("NaN".into())));
        assert_eq!(
            row.get("big"),
            Some(&Value::Text("123456789012345678901234567890.5".into()))
        );

        let mut cursor = adapter
            .query("SELECT 1 AS a; SELECT 2 AS b")
            .await?
            .into_cursor()
            .unwrap();
        let row = cursor.next().unwrap();
        assert_eq!(row.get("a"), None);
        assert_eq!(row.get("b"), Some(&Value::Text("2".into())));
        assert!(!cursor.valid());

        match adapter.query("SELECT * FROM no_such_table").await {
            Err(AdapterError::QueryError(message)) => {
                assert_eq!(message, r#"relation "no_such_table" does not exist"#);
            }
            other => panic!("expected QueryError, got {other:?}"),
        }

        adapter.disconnect().await;
        assert!(!adapter.connected());
        adapter.disconnect().await;
        Ok::<(), AdapterError>(())
    })?;

    stop_postgres_embedded(pg);
    Ok(())
}
