//! Email table access. Filters are pushed down to SQLite.

use crate::models::{
  email::{DbEmail, EmailType, NewEmail},
  inbox::Inbox,
};
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const COLUMNS: &str = "id, message_id, from_address, from_name, to_address, recipient, title, body_text, body_html, sent_at, received_at, email_type, email_result, email_result_text, email_error, read_status";

/// Columns matched by substring and regex search.
const SEARCH_COLUMNS: [&str; 5] = ["title", "body_text", "from_name", "from_address", "to_address"];

/// Filters shared by list and count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailFilter {
  pub read_status: Option<bool>,
  pub email_types: Vec<EmailType>,
  pub recipients: Vec<String>,
  /// Case-insensitive substring over the search columns.
  pub search: Option<String>,
}

/// Escape `LIKE` wildcards so the term matches literally.
pub fn like_pattern(term: &str) -> String {
  let mut out = String::with_capacity(term.len() + 2);
  out.push('%');
  for c in term.chars() {
    if matches!(c, '\\' | '%' | '_') {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('%');
  out
}

fn push_search(qb: &mut QueryBuilder<'_, Sqlite>, term: &str) {
  let pattern = like_pattern(term);
  qb.push("(");
  for (i, col) in SEARCH_COLUMNS.iter().enumerate() {
    if i > 0 {
      qb.push(" OR ");
    }
    qb.push(format!("coalesce({col}, '') LIKE "))
      .push_bind(pattern.clone())
      .push(" ESCAPE '\\'");
  }
  qb.push(")");
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &EmailFilter) {
  let mut sep = " WHERE ";
  if let Some(read) = filter.read_status {
    qb.push(sep).push("read_status = ").push_bind(i64::from(read));
    sep = " AND ";
  }
  if !filter.email_types.is_empty() {
    qb.push(sep).push("email_type IN (");
    let mut list = qb.separated(", ");
    for t in &filter.email_types {
      list.push_bind(t.as_str());
    }
    list.push_unseparated(")");
    sep = " AND ";
  }
  if !filter.recipients.is_empty() {
    qb.push(sep).push("to_address IN (");
    let mut list = qb.separated(", ");
    for r in &filter.recipients {
      list.push_bind(r.clone());
    }
    list.push_unseparated(")");
    sep = " AND ";
  }
  if let Some(term) = filter.search.as_deref() {
    qb.push(sep);
    push_search(qb, term);
  }
}

/// One page of emails, newest first.
pub async fn list(
  pool: &SqlitePool,
  filter: &EmailFilter,
  limit: i64,
  offset: i64,
) -> Result<Vec<DbEmail>, sqlx::Error> {
  let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {COLUMNS} FROM email"));
  push_filters(&mut qb, filter);
  qb.push(" ORDER BY sent_at DESC, id DESC LIMIT ")
    .push_bind(limit)
    .push(" OFFSET ")
    .push_bind(offset);
  qb.build_query_as::<DbEmail>().fetch_all(pool).await
}

pub async fn count(pool: &SqlitePool, filter: &EmailFilter) -> Result<i64, sqlx::Error> {
  let mut qb = QueryBuilder::<Sqlite>::new("SELECT count(*) FROM email");
  push_filters(&mut qb, filter);
  qb.build_query_scalar::<i64>().fetch_one(pool).await
}

pub async fn create(pool: &SqlitePool, email: &NewEmail) -> Result<DbEmail, sqlx::Error> {
  let sql = format!(
    "INSERT INTO email (message_id, from_address, from_name, to_address, recipient, title, body_text, body_html, sent_at, received_at, email_type, email_result, email_result_text, email_error, read_status) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0) RETURNING {COLUMNS}"
  );
  sqlx::query_as::<_, DbEmail>(&sql)
    .bind(&email.message_id)
    .bind(&email.from_address)
    .bind(&email.from_name)
    .bind(&email.to_address)
    .bind(&email.recipient)
    .bind(&email.title)
    .bind(&email.body_text)
    .bind(&email.body_html)
    .bind(email.sent_at)
    .bind(email.received_at)
    .bind(email.email_type.as_str())
    .bind(&email.email_result)
    .bind(&email.email_result_text)
    .bind(&email.email_error)
    .fetch_one(pool)
    .await
}

fn push_id_list(qb: &mut QueryBuilder<'_, Sqlite>, ids: &[i64]) {
  qb.push("id IN (");
  let mut list = qb.separated(", ");
  for id in ids {
    list.push_bind(*id);
  }
  list.push_unseparated(")");
}

pub async fn delete(pool: &SqlitePool, ids: &[i64]) -> Result<u64, sqlx::Error> {
  if ids.is_empty() {
    return Ok(0);
  }
  let mut qb = QueryBuilder::<Sqlite>::new("DELETE FROM email WHERE ");
  push_id_list(&mut qb, ids);
  Ok(qb.build().execute(pool).await?.rows_affected())
}

pub async fn delete_by_recipients(
  pool: &SqlitePool,
  addresses: &[String],
) -> Result<u64, sqlx::Error> {
  if addresses.is_empty() {
    return Ok(0);
  }
  let mut qb = QueryBuilder::<Sqlite>::new("DELETE FROM email WHERE to_address IN (");
  let mut list = qb.separated(", ");
  for a in addresses {
    list.push_bind(a.clone());
  }
  list.push_unseparated(")");
  Ok(qb.build().execute(pool).await?.rows_affected())
}

/// Replace the extraction result of one email.
pub async fn update_extraction(
  pool: &SqlitePool,
  id: i64,
  result: Option<&str>,
  email_type: EmailType,
) -> Result<u64, sqlx::Error> {
  let res = sqlx::query("UPDATE email SET email_type = ?, email_result = ? WHERE id = ?")
    .bind(email_type.as_str())
    .bind(result)
    .bind(id)
    .execute(pool)
    .await?;
  Ok(res.rows_affected())
}

pub async fn set_read_status(pool: &SqlitePool, ids: &[i64], read: bool) -> Result<u64, sqlx::Error> {
  if ids.is_empty() {
    return Ok(0);
  }
  let mut qb = QueryBuilder::<Sqlite>::new("UPDATE email SET read_status = ");
  qb.push_bind(i64::from(read)).push(" WHERE ");
  push_id_list(&mut qb, ids);
  Ok(qb.build().execute(pool).await?.rows_affected())
}

/// Mark every unread email read, optionally only for one recipient.
pub async fn mark_all_read(pool: &SqlitePool, recipient: Option<&str>) -> Result<u64, sqlx::Error> {
  let res = match recipient {
    Some(r) => {
      sqlx::query("UPDATE email SET read_status = 1 WHERE read_status = 0 AND to_address = ?")
        .bind(r)
        .execute(pool)
        .await?
    }
    None => {
      sqlx::query("UPDATE email SET read_status = 1 WHERE read_status = 0")
        .execute(pool)
        .await?
    }
  };
  Ok(res.rows_affected())
}

/// Distinct recipient addresses, alphabetically.
pub async fn recipients(pool: &SqlitePool) -> Result<Vec<String>, sqlx::Error> {
  sqlx::query_scalar(
    "SELECT to_address FROM email WHERE to_address IS NOT NULL GROUP BY to_address ORDER BY to_address",
  )
  .fetch_all(pool)
  .await
}

/// Per-recipient totals, largest first. Every term must match.
pub async fn inboxes(pool: &SqlitePool, terms: &[String]) -> Result<Vec<Inbox>, sqlx::Error> {
  let mut qb = QueryBuilder::<Sqlite>::new(
    "SELECT to_address AS address, count(*) AS total, coalesce(sum(CASE WHEN read_status = 0 THEN 1 ELSE 0 END), 0) AS unread FROM email WHERE to_address IS NOT NULL",
  );
  for term in terms {
    qb.push(" AND ");
    push_search(&mut qb, term);
  }
  qb.push(" GROUP BY to_address ORDER BY total DESC, address");
  qb.build_query_as::<Inbox>().fetch_all(pool).await
}

/// Delete emails of the given types sent before `cutoff`; returns their ids.
pub async fn delete_expired(
  pool: &SqlitePool,
  types: &[EmailType],
  cutoff: DateTime<Utc>,
) -> Result<Vec<i64>, sqlx::Error> {
  if types.is_empty() {
    return Ok(Vec::new());
  }
  let mut qb = QueryBuilder::<Sqlite>::new("DELETE FROM email WHERE email_type IN (");
  let mut list = qb.separated(", ");
  for t in types {
    list.push_bind(t.as_str());
  }
  list.push_unseparated(")");
  qb.push(" AND sent_at < ").push_bind(cutoff).push(" RETURNING id");
  qb.build_query_scalar::<i64>().fetch_all(pool).await
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::memory_pool;
  use chrono::Duration;

  fn sample(n: i64, to: &str, title: &str) -> NewEmail {
    NewEmail {
      message_id: Some(format!("<{n}@test>")),
      from_address: Some("sender@example.test".into()),
      from_name: Some("Sender".into()),
      to_address: Some(to.into()),
      title: Some(title.into()),
      body_text: Some("body".into()),
      sent_at: Some(Utc::now() - Duration::minutes(100 - n)),
      received_at: Utc::now(),
      ..NewEmail::default()
    }
  }

  #[test]
  fn like_pattern_escapes_wildcards() {
    assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
  }

  #[tokio::test]
  async fn list_orders_newest_first_and_counts() {
    let pool = memory_pool().await;
    for n in 0..5 {
      create(&pool, &sample(n, "a@x.test", &format!("mail {n}")))
        .await
        .unwrap();
    }
    let rows = list(&pool, &EmailFilter::default(), 2, 1).await.unwrap();
    let titles: Vec<_> = rows.iter().map(|r| r.title.clone().unwrap()).collect();
    assert_eq!(titles, vec!["mail 3", "mail 2"]);
    assert_eq!(count(&pool, &EmailFilter::default()).await.unwrap(), 5);
  }

  #[tokio::test]
  async fn filters_combine() {
    let pool = memory_pool().await;
    let first = create(&pool, &sample(1, "a@x.test", "Your Invoice")).await.unwrap();
    create(&pool, &sample(2, "b@x.test", "invoice again")).await.unwrap();
    let mut code = sample(3, "a@x.test", "code 1234");
    code.email_type = EmailType::AuthCode;
    create(&pool, &code).await.unwrap();
    set_read_status(&pool, &[first.id], true).await.unwrap();

    let search = EmailFilter {
      search: Some("INVOICE".into()),
      ..EmailFilter::default()
    };
    assert_eq!(count(&pool, &search).await.unwrap(), 2);

    let unread_a = EmailFilter {
      read_status: Some(false),
      recipients: vec!["a@x.test".into()],
      ..EmailFilter::default()
    };
    assert_eq!(count(&pool, &unread_a).await.unwrap(), 1);

    let typed = EmailFilter {
      email_types: vec![EmailType::AuthCode, EmailType::AuthLink],
      ..EmailFilter::default()
    };
    let rows = list(&pool, &typed, 10, 0).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].email_type, "auth_code");

    let literal = EmailFilter {
      search: Some("in%ce".into()),
      ..EmailFilter::default()
    };
    assert_eq!(count(&pool, &literal).await.unwrap(), 0);
  }

  #[tokio::test]
  async fn duplicate_message_id_is_a_unique_violation() {
    let pool = memory_pool().await;
    create(&pool, &sample(1, "a@x.test", "one")).await.unwrap();
    let err = create(&pool, &sample(1, "a@x.test", "one")).await.unwrap_err();
    assert!(err
      .as_database_error()
      .is_some_and(|e| e.is_unique_violation()));
  }

  #[tokio::test]
  async fn inboxes_and_bulk_mutations() {
    let pool = memory_pool().await;
    for n in 0..3 {
      create(&pool, &sample(n, "a@x.test", "hello")).await.unwrap();
    }
    create(&pool, &sample(10, "b@x.test", "world")).await.unwrap();

    let boxes = inboxes(&pool, &[]).await.unwrap();
    assert_eq!(
      boxes[0],
      Inbox {
        address: "a@x.test".into(),
        total: 3,
        unread: 3
      }
    );
    assert_eq!(inboxes(&pool, &["world".into()]).await.unwrap().len(), 1);
    assert_eq!(recipients(&pool).await.unwrap(), vec!["a@x.test", "b@x.test"]);

    assert_eq!(mark_all_read(&pool, Some("a@x.test")).await.unwrap(), 3);
    assert_eq!(inboxes(&pool, &[]).await.unwrap()[0].unread, 0);

    assert_eq!(delete_by_recipients(&pool, &["a@x.test".into()]).await.unwrap(), 3);
    assert_eq!(count(&pool, &EmailFilter::default()).await.unwrap(), 1);
  }

  #[tokio::test]
  async fn delete_expired_only_touches_old_matching_types() {
    let pool = memory_pool().await;
    let mut old_code = sample(1, "a@x.test", "old code");
    old_code.email_type = EmailType::AuthCode;
    old_code.sent_at = Some(Utc::now() - Duration::days(3));
    let old_code = create(&pool, &old_code).await.unwrap();

    let mut old_other = sample(2, "a@x.test", "old newsletter");
    old_other.sent_at = Some(Utc::now() - Duration::days(3));
    create(&pool, &old_other).await.unwrap();

    let mut fresh_code = sample(3, "a@x.test", "fresh code");
    fresh_code.email_type = EmailType::AuthCode;
    create(&pool, &fresh_code).await.unwrap();

    let cutoff = Utc::now() - Duration::days(1);
    let ids = delete_expired(&pool, &[EmailType::AuthCode], cutoff).await.unwrap();
    assert_eq!(ids, vec![old_code.id]);
    assert_eq!(count(&pool, &EmailFilter::default()).await.unwrap(), 2);
  }
}
