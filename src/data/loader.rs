use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};

use super::model::{CellValue, Table};
use crate::error::ViewerError;

// ---------------------------------------------------------------------------
// Source reference
// ---------------------------------------------------------------------------

const DOC_SEGMENT: &str = "spreadsheets/d/";

/// Cells matching one of these (exactly) are read as missing.
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A Google Sheet document (and optionally a worksheet tab) to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRef {
    pub id: String,
    pub gid: Option<String>,
}

impl SheetRef {
    /// Extract the document id from a sheet URL.
    ///
    /// The URL must contain `spreadsheets/d/<id>`; the id ends at the next
    /// `/`, `?` or `#`. A `gid=<digits>` anywhere after it selects the tab.
    pub fn parse(url: &str) -> Result<Self, ViewerError> {
        let invalid = || ViewerError::InvalidSourceReference(url.to_string());

        let start = url.find(DOC_SEGMENT).ok_or_else(invalid)? + DOC_SEGMENT.len();
        let rest = &url[start..];
        let end = rest.find(|c: char| matches!(c, '/' | '?' | '#')).unwrap_or(rest.len());
        let id = rest[..end].trim();
        if id.is_empty() {
            return Err(invalid());
        }

        let gid = rest.find("gid=").and_then(|pos| {
            let digits: String = rest[pos + 4..]
                .chars()
                .take_while(char::is_ascii_digit)
                .collect();
            (!digits.is_empty()).then_some(digits)
        });

        Ok(SheetRef {
            id: id.to_string(),
            gid,
        })
    }

    /// Public CSV export endpoint for this sheet.
    pub fn csv_export_url(&self) -> String {
        let mut url = format!(
            "https://docs.google.com/spreadsheets/d/{}/export?format=csv",
            self.id
        );
        if let Some(gid) = &self.gid {
            url.push_str("&gid=");
            url.push_str(gid);
        }
        url
    }
}

// ---------------------------------------------------------------------------
// Fetch capability
// ---------------------------------------------------------------------------

/// Retrieves the raw CSV text behind a URL.
pub trait CsvFetcher {
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Blocking HTTP fetcher.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self { client })
    }
}

impl CsvFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("requesting {url}"))?;
        let status = response.status();
        if !status.is_success() {
            bail!("{url} returned HTTP {status} (is the sheet shared publicly?)");
        }
        response.text().context("reading response body")
    }
}

// ---------------------------------------------------------------------------
// CSV parsing
// ---------------------------------------------------------------------------

/// Parse CSV text into a typed table.
///
/// With `skip_first_row` the first record is dropped and the second becomes
/// the header. Short rows are padded with nulls.
pub fn parse_csv(text: &str, skip_first_row: bool) -> Result<Table, ViewerError> {
    let mut records = read_records(text)
        .map_err(|e| ViewerError::LoadFailure(format!("{e:#}")))?
        .into_iter();
    if skip_first_row {
        records.next();
    }

    let Some(header) = records.next() else {
        return Err(ViewerError::EmptyResult);
    };
    let columns = header_names(&header);
    if columns.is_empty() {
        return Err(ViewerError::EmptyResult);
    }

    let width = columns.len();
    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for (i, mut record) in records.enumerate() {
        if record.len() > width {
            if record[width..].iter().any(|f| !f.is_empty()) {
                return Err(ViewerError::LoadFailure(format!(
                    "expected {width} fields in data row {}, saw {}",
                    i + 1,
                    record.len()
                )));
            }
            record.truncate(width);
        }
        record.resize(width, String::new());
        raw_rows.push(record);
    }
    if raw_rows.is_empty() {
        return Err(ViewerError::EmptyResult);
    }

    let typed_columns: Vec<Vec<CellValue>> = (0..width)
        .map(|c| infer_column(raw_rows.iter().map(|row| row[c].as_str())))
        .collect();
    let rows: Vec<Vec<CellValue>> = (0..raw_rows.len())
        .map(|r| typed_columns.iter().map(|col| col[r].clone()).collect())
        .collect();

    Table::new(columns, rows)
}

fn read_records(text: &str) -> Result<Vec<Vec<String>>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    reader
        .records()
        .enumerate()
        .map(|(i, result)| {
            let record = result.with_context(|| format!("CSV record {i}"))?;
            Ok(record.iter().map(str::to_string).collect())
        })
        .collect()
}

/// Blank names become `Unnamed: <i>`; repeats get `.1`, `.2`, … suffixes.
fn header_names(header: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    header
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let base = if raw.trim().is_empty() {
                format!("Unnamed: {i}")
            } else {
                raw.clone()
            };
            let mut name = base.clone();
            let mut n = 0;
            while seen.contains(&name) {
                n += 1;
                name = format!("{base}.{n}");
            }
            seen.insert(name.clone());
            name
        })
        .collect()
}

/// NA tokens match exactly; any spelling of NaN is missing too.
fn is_na(s: &str) -> bool {
    NA_TOKENS.contains(&s) || s.trim().eq_ignore_ascii_case("nan")
}

/// Infinities do not count as numbers, so a column holding `inf` reads as text.
fn parse_finite(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Pick one type for the whole column: integer, float, bool, else text.
fn infer_column<'a>(raw: impl Iterator<Item = &'a str> + Clone) -> Vec<CellValue> {
    let present = raw.clone().filter(|s| !is_na(s));

    let all_int = present.clone().all(|s| s.trim().parse::<i64>().is_ok());
    let all_float = all_int || present.clone().all(|s| parse_finite(s).is_some());
    let all_bool = present.clone().all(|s| parse_bool(s).is_some());

    raw.map(|s| {
        if is_na(s) {
            return CellValue::Null;
        }
        let t = s.trim();
        if all_int {
            t.parse().map(CellValue::Integer).unwrap_or(CellValue::Null)
        } else if all_float {
            parse_finite(t).map(CellValue::Float).unwrap_or(CellValue::Null)
        } else if all_bool {
            parse_bool(s).map(CellValue::Bool).unwrap_or(CellValue::Null)
        } else {
            CellValue::Text(s.to_string())
        }
    })
    .collect()
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Time-bounded cache + loader
// ---------------------------------------------------------------------------

/// How long a loaded sheet is reused for an identical request.
pub const CACHE_TTL: Duration = Duration::from_secs(600);

type CacheKey = (String, bool);

/// Memoizes loaded tables by (source URL, skip flag).
pub struct FetchCache {
    ttl: Duration,
    entries: HashMap<CacheKey, (Instant, Table)>,
}

impl FetchCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    fn get(&mut self, key: &CacheKey, now: Instant) -> Option<Table> {
        let fresh = self
            .entries
            .get(key)
            .is_some_and(|(stored, _)| now.saturating_duration_since(*stored) < self.ttl);
        if !fresh {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|(_, table)| table.clone())
    }

    /// Store `table`, dropping every entry that has outlived the TTL.
    fn insert(&mut self, key: CacheKey, now: Instant, table: Table) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, (stored, _)| now.saturating_duration_since(*stored) < ttl);
        self.entries.insert(key, (now, table));
    }
}

/// Loads sheets through a [`CsvFetcher`], reusing recent results.
pub struct SheetLoader {
    fetcher: Box<dyn CsvFetcher>,
    cache: FetchCache,
}

impl SheetLoader {
    pub fn new(fetcher: Box<dyn CsvFetcher>) -> Self {
        Self {
            fetcher,
            cache: FetchCache::new(CACHE_TTL),
        }
    }

    /// Loader backed by the public Google Sheets export endpoint.
    pub fn http() -> Result<Self> {
        Ok(Self::new(Box::new(HttpFetcher::new(Duration::from_secs(30))?)))
    }

    pub fn load(&mut self, url: &str, skip_first_row: bool) -> Result<Table, ViewerError> {
        self.load_at(url, skip_first_row, Instant::now())
    }

    fn load_at(&mut self, url: &str, skip_first_row: bool, now: Instant) -> Result<Table, ViewerError> {
        let sheet = SheetRef::parse(url)?;
        let key = (url.to_string(), skip_first_row);
        if let Some(table) = self.cache.get(&key, now) {
            log::debug!("cache hit for sheet {}", sheet.id);
            return Ok(table);
        }

        let export_url = sheet.csv_export_url();
        log::info!("fetching {export_url}");
        let text = self
            .fetcher
            .fetch(&export_url)
            .map_err(|e| ViewerError::LoadFailure(format!("{e:#}")))?;
        let table = parse_csv(&text, skip_first_row)?;

        log::info!(
            "loaded {} rows with columns {:?}",
            table.len(),
            table.columns()
        );
        self.cache.insert(key, now, table.clone());
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use pretty_assertions::assert_eq;

    const URL: &str = "https://docs.google.com/spreadsheets/d/abc123/edit#gid=0";

    struct StubFetcher {
        body: std::result::Result<String, String>,
        calls: Rc<Cell<usize>>,
    }

    impl CsvFetcher for StubFetcher {
        fn fetch(&self, _url: &str) -> Result<String> {
            self.calls.set(self.calls.get() + 1);
            self.body.clone().map_err(anyhow::Error::msg)
        }
    }

    fn stub(body: std::result::Result<&str, &str>) -> (SheetLoader, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let fetcher = StubFetcher {
            body: body.map(str::to_string).map_err(str::to_string),
            calls: Rc::clone(&calls),
        };
        (SheetLoader::new(Box::new(fetcher)), calls)
    }

    #[test]
    fn parses_document_id_and_gid() {
        let r = SheetRef::parse(URL).unwrap();
        assert_eq!(r.id, "abc123");
        assert_eq!(r.gid.as_deref(), Some("0"));
        assert_eq!(
            r.csv_export_url(),
            "https://docs.google.com/spreadsheets/d/abc123/export?format=csv&gid=0"
        );

        let r = SheetRef::parse("docs.google.com/spreadsheets/d/xyz").unwrap();
        assert_eq!(r.id, "xyz");
        assert_eq!(r.gid, None);
    }

    #[test]
    fn rejects_urls_without_document_id() {
        for url in ["", "https://example.com/sheet", "https://docs.google.com/spreadsheets/d/"] {
            assert_eq!(
                SheetRef::parse(url),
                Err(ViewerError::InvalidSourceReference(url.to_string()))
            );
        }
    }

    #[test]
    fn skip_first_row_uses_second_as_header() {
        let text = "Report title,,\nRegion,Score,Note\nA,10,x\nB,20,\n";
        let t = parse_csv(text, true).unwrap();
        assert_eq!(t.columns(), &["Region", "Score", "Note"]);
        assert_eq!(t.len(), 2);
        assert_eq!(
            t.rows()[1],
            vec![
                CellValue::Text("B".into()),
                CellValue::Integer(20),
                CellValue::Null
            ]
        );

        let t = parse_csv(text, false).unwrap();
        assert_eq!(t.columns(), &["Report title", "Unnamed: 1", "Unnamed: 2"]);
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn infers_one_type_per_column() {
        let text = "i,f,b,t\n1,1,TRUE,a\n2,2.5,false,1\nNA,,True,\n";
        let t = parse_csv(text, false).unwrap();
        assert_eq!(
            t.rows()[0],
            vec![
                CellValue::Integer(1),
                CellValue::Float(1.0),
                CellValue::Bool(true),
                CellValue::Text("a".into()),
            ]
        );
        assert_eq!(t.rows()[1][3], CellValue::Text("1".into()));
        assert_eq!(t.rows()[2][0], CellValue::Null);
        assert_eq!(t.rows()[2][1], CellValue::Null);
    }

    #[test]
    fn nan_is_missing_and_infinity_is_text() {
        let t = parse_csv("x,y\n1.5,1\nNAN,inf\nnan,2\n", false).unwrap();
        assert_eq!(
            t.column_values(0).collect::<Vec<_>>(),
            vec![&CellValue::Float(1.5), &CellValue::Null, &CellValue::Null]
        );
        assert_eq!(t.rows()[1][1], CellValue::Text("inf".into()));
        assert_eq!(t.rows()[2][1], CellValue::Text("2".into()));
    }

    #[test]
    fn duplicate_headers_are_renamed() {
        let t = parse_csv("a,a,a\n1,2,3\n", false).unwrap();
        assert_eq!(t.columns(), &["a", "a.1", "a.2"]);
    }

    #[test]
    fn short_rows_padded_long_rows_rejected() {
        let t = parse_csv("a,b\n1\n", false).unwrap();
        assert_eq!(t.rows()[0], vec![CellValue::Integer(1), CellValue::Null]);

        let t = parse_csv("a,b\n1,2,\n", false).unwrap();
        assert_eq!(t.width(), 2);

        let err = parse_csv("a,b\n1,2,3\n", false).unwrap_err();
        assert!(matches!(err, ViewerError::LoadFailure(_)));
    }

    #[test]
    fn empty_sheets_are_empty_results() {
        assert_eq!(parse_csv("", false), Err(ViewerError::EmptyResult));
        assert_eq!(parse_csv("a,b\n", false), Err(ViewerError::EmptyResult));
        assert_eq!(parse_csv("title\n", true), Err(ViewerError::EmptyResult));
    }

    #[test]
    fn invalid_url_never_fetches() {
        let (mut loader, calls) = stub(Ok("a\n1\n"));
        let err = loader.load("https://example.com", true).unwrap_err();
        assert!(matches!(err, ViewerError::InvalidSourceReference(_)));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn fetch_errors_become_load_failures() {
        let (mut loader, _) = stub(Err("connection refused"));
        let err = loader.load(URL, false).unwrap_err();
        assert_eq!(err, ViewerError::LoadFailure("connection refused".into()));
    }

    #[test]
    fn cache_reuses_recent_loads() {
        let (mut loader, calls) = stub(Ok("a\n1\n"));
        let start = Instant::now();

        loader.load_at(URL, false, start).unwrap();
        loader.load_at(URL, false, start + Duration::from_secs(10)).unwrap();
        assert_eq!(calls.get(), 1);

        // Different skip flag is a different request.
        let _ = loader.load_at(URL, true, start);
        assert_eq!(calls.get(), 2);

        loader.load_at(URL, false, start + CACHE_TTL).unwrap();
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn insert_prunes_expired_entries() {
        let table = parse_csv("a\n1\n", false).unwrap();
        let start = Instant::now();
        let mut cache = FetchCache::new(CACHE_TTL);
        cache.insert(("old".into(), false), start, table.clone());
        cache.insert(("recent".into(), false), start + Duration::from_secs(300), table.clone());

        cache.insert(("new".into(), true), start + CACHE_TTL, table);
        let mut keys: Vec<&str> = cache.entries.keys().map(|(url, _)| url.as_str()).collect();
        keys.sort();
        assert_eq!(keys, vec!["new", "recent"]);
    }
}
