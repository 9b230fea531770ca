//! Cursor pagination: page values and the aggregator that flattens a list endpoint.
//!
//! The aggregator is generic over item type and page source. It only relies on the loader
//! honoring `limit` and returning the next cursor; how a page is fetched (HTTP, cache, test
//! double) is the loader's business.

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, DecodeError},
	obs::{self, CallKind, CallOutcome, CallSpan},
};

/// Field carrying the next cursor in list payloads.
pub const CURSOR_FIELD: &str = "cursor";

/// Parameters of one page fetch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
	/// Cursor returned by the previous page; `None` for the first page.
	pub cursor: Option<String>,
	/// Maximum number of items requested.
	pub limit: u32,
}
impl PageRequest {
	/// Request for the first page.
	pub fn first(limit: u32) -> Self {
		Self { cursor: None, limit }
	}

	/// Request for the page following `cursor`.
	pub fn after(cursor: impl Into<String>, limit: u32) -> Self {
		Self { cursor: Some(cursor.into()), limit }
	}

	/// Query parameters understood by list endpoints; blank cursors are omitted.
	pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
		let mut pairs = vec![("limit", self.limit.to_string())];

		if let Some(cursor) = self.cursor.as_deref().filter(|c| !c.trim().is_empty()) {
			pairs.push((CURSOR_FIELD, cursor.to_owned()));
		}

		pairs
	}
}

/// One page of results.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
	/// Items in server order.
	pub items: Vec<T>,
	/// Cursor for the following page, if the server returned one.
	pub next_cursor: Option<String>,
}
impl<T> Page<T> {
	/// Creates a page.
	pub fn new(items: Vec<T>, next_cursor: Option<String>) -> Self {
		Self { items, next_cursor }
	}
}
impl<T> Page<T>
where
	T: DeserializeOwned,
{
	/// Decodes a list payload shaped as `{ <items_key>: [...], "cursor": string | null }`.
	///
	/// A `null` payload or a missing/`null` items field decodes as an empty page. Non-string
	/// cursors read as absent.
	pub fn from_value(value: Value, items_key: &str) -> Result<Self, DecodeError> {
		let mut object = match value {
			Value::Object(object) => object,
			Value::Null => return Ok(Self::new(Vec::new(), None)),
			_ => return Err(DecodeError::UnexpectedShape { expected: "object" }),
		};
		let next_cursor = match object.remove(CURSOR_FIELD) {
			Some(Value::String(cursor)) => Some(cursor),
			_ => None,
		};
		let items = match object.remove(items_key) {
			None | Some(Value::Null) => Vec::new(),
			Some(items) => serde_path_to_error::deserialize(items)
				.map_err(|source| DecodeError::Json { source })?,
		};

		Ok(Self { items, next_cursor })
	}
}

/// Decision taken after a page arrives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
	/// Page came back short; nothing more to fetch.
	Exhausted,
	/// Next cursor is absent, blank, or identical to the one just used.
	NonAdvancing,
	/// Fetch the page after this cursor.
	Continue(String),
}

/// Stop condition for a single page: short pages end the run, then cursors must advance.
pub fn next_step(current: Option<&str>, page_len: usize, next: Option<&str>, limit: u32) -> Step {
	if page_len < limit as usize {
		return Step::Exhausted;
	}

	match next {
		Some(next) if !next.trim().is_empty() && Some(next) != current =>
			Step::Continue(next.to_owned()),
		_ => Step::NonAdvancing,
	}
}

/// Fetches every page through `loader` and returns all items in server order.
///
/// The first call uses no cursor. Pages are fetched strictly one after another. A loader
/// failure aborts the run and is returned as is; items gathered so far are discarded. A
/// cursor seen earlier in the same run ends it, so cyclic sources terminate.
///
/// Cursor progress is judged against the cursor that was sent. A source that answers the
/// first (cursorless) call with cursor `c` and keeps returning `c` is therefore fetched twice,
/// not once: the second call is the first to send `c` and get it back unchanged.
pub async fn load_all<T, F, Fut>(mut loader: F, limit: u32) -> Result<Vec<T>>
where
	F: FnMut(PageRequest) -> Fut,
	Fut: Future<Output = Result<Page<T>>>,
{
	if limit == 0 {
		return Err(ConfigError::InvalidPageLimit.into());
	}

	const KIND: CallKind = CallKind::Pagination;

	let span = CallSpan::new(KIND, "load_all");

	obs::record_call_outcome(KIND, CallOutcome::Attempt);

	let result = span.instrument(aggregate(&mut loader, limit)).await;

	obs::record_call_outcome(KIND, CallOutcome::of(&result));

	result
}

async fn aggregate<T, F, Fut>(loader: &mut F, limit: u32) -> Result<Vec<T>>
where
	F: FnMut(PageRequest) -> Fut,
	Fut: Future<Output = Result<Page<T>>>,
{
	let mut accumulated = Vec::new();
	let mut cursor = None::<String>;
	let mut visited = HashSet::new();

	loop {
		let page = loader(PageRequest { cursor: cursor.clone(), limit }).await?;
		let len = page.items.len();

		accumulated.extend(page.items);

		match next_step(cursor.as_deref(), len, page.next_cursor.as_deref(), limit) {
			Step::Continue(next) if visited.insert(next.clone()) => cursor = Some(next),
			_ => return Ok(accumulated),
		}
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::future;
	// self
	use super::*;

	fn page(range: std::ops::Range<u32>, next: Option<&str>) -> Page<u32> {
		Page::new(range.collect(), next.map(str::to_owned))
	}

	#[test]
	fn stop_conditions() {
		assert_eq!(next_step(None, 3, Some("c1"), 10), Step::Exhausted);
		assert_eq!(next_step(None, 10, None, 10), Step::NonAdvancing);
		assert_eq!(next_step(None, 10, Some("  "), 10), Step::NonAdvancing);
		assert_eq!(next_step(Some("c1"), 10, Some("c1"), 10), Step::NonAdvancing);
		assert_eq!(next_step(Some("c1"), 10, Some("c2"), 10), Step::Continue("c2".into()));
	}

	#[tokio::test]
	async fn chained_pages_are_flattened_in_order() {
		let mut seen = Vec::new();
		let items = load_all(
			|request: PageRequest| {
				seen.push(request.cursor.clone());

				let page = match request.cursor.as_deref() {
					None => page(0..10, Some("c1")),
					Some("c1") => page(10..20, Some("c2")),
					_ => page(20..23, None),
				};

				future::ready(Ok(page))
			},
			10,
		)
		.await
		.expect("Aggregation should succeed.");

		assert_eq!(items, (0..23).collect::<Vec<_>>());
		assert_eq!(seen, vec![None, Some("c1".into()), Some("c2".into())]);
	}

	#[tokio::test]
	async fn echoed_cursor_stops_after_one_call() {
		let mut calls = 0;
		let items = load_all(
			|request: PageRequest| {
				calls += 1;

				future::ready(Ok(Page::new(vec![0_u32; 5], request.cursor)))
			},
			5,
		)
		.await
		.expect("Aggregation should succeed.");

		assert_eq!(calls, 1);
		assert_eq!(items.len(), 5);
	}

	#[tokio::test]
	async fn constant_cursor_stops_on_first_non_advancing_page() {
		let mut calls = 0;
		let items = load_all(
			|_| {
				calls += 1;

				future::ready(Ok(page(0..4, Some("c"))))
			},
			4,
		)
		.await
		.expect("Aggregation should succeed.");

		assert_eq!(calls, 2);
		assert_eq!(items.len(), 8);
	}

	#[tokio::test]
	async fn cyclic_cursors_terminate() {
		let mut calls = 0;
		let items = load_all(
			|request: PageRequest| {
				calls += 1;

				let next = match request.cursor.as_deref() {
					None | Some("c2") => "c1",
					_ => "c2",
				};

				future::ready(Ok(page(0..2, Some(next))))
			},
			2,
		)
		.await
		.expect("Aggregation should succeed.");

		// None -> c1 -> c2 -> c1 (already visited).
		assert_eq!(calls, 3);
		assert_eq!(items.len(), 6);
	}

	#[tokio::test]
	async fn loader_failures_discard_partial_results() {
		let mut calls = 0;
		let err = load_all(
			|_| {
				calls += 1;

				future::ready(if calls == 1 {
					Ok(page(0..2, Some("c1")))
				} else {
					Err(Error::from_status(500, b"boom"))
				})
			},
			2,
		)
		.await
		.expect_err("Second page failure should abort the run.");

		assert_eq!(err.status(), 500);
	}

	#[tokio::test]
	async fn empty_first_page_is_success() {
		let items = load_all(|_| future::ready(Ok(page(0..0, None))), 10)
			.await
			.expect("Empty sources should succeed.");

		assert!(items.is_empty());
	}

	#[tokio::test]
	async fn zero_limit_is_rejected() {
		let err = load_all(|_| future::ready(Ok(page(0..0, None))), 0)
			.await
			.expect_err("Zero limit should be rejected.");

		assert!(matches!(err, Error::Config(ConfigError::InvalidPageLimit)));
	}

	#[test]
	fn list_payloads_decode_by_items_key() {
		let decoded = Page::<String>::from_value(
			serde_json::json!({ "users": ["a", "b"], "cursor": "next" }),
			"users",
		)
		.expect("Well-formed payload should decode.");

		assert_eq!(decoded, Page::new(vec!["a".into(), "b".into()], Some("next".into())));

		let missing = Page::<String>::from_value(serde_json::json!({ "cursor": null }), "nodes")
			.expect("Missing items should decode as empty.");

		assert!(missing.items.is_empty());
		assert_eq!(missing.next_cursor, None);
		assert!(matches!(
			Page::<String>::from_value(serde_json::json!([1, 2]), "users"),
			Err(DecodeError::UnexpectedShape { expected: "object" })
		));
		assert!(matches!(
			Page::<u32>::from_value(serde_json::json!({ "users": ["x"] }), "users"),
			Err(DecodeError::Json { .. })
		));
	}

	#[test]
	fn query_pairs_skip_blank_cursors() {
		assert_eq!(PageRequest::first(25).query_pairs(), vec![("limit", "25".to_owned())]);
		assert_eq!(PageRequest::after(" ", 25).query_pairs().len(), 1);
		assert_eq!(
			PageRequest::after("abc", 5).query_pairs(),
			vec![("limit", "5".to_owned()), ("cursor", "abc".to_owned())]
		);
	}
}
