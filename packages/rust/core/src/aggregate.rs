//! Result ordering.
//!
//! Records are ordered by `year` compared as plain strings, ties broken by
//! discovery order. The `"N/A"` sentinel is compared by its literal text, so
//! it lands after every numeric year.

use franchise_crawler::CrawledRecord;
use franchise_shared::DetailRecord;

/// Sort crawl records by year (as a string) and strip crawl bookkeeping.
pub fn sort_by_year(mut records: Vec<CrawledRecord>) -> Vec<DetailRecord> {
    records.sort_by(|a, b| {
        a.record
            .year
            .cmp(&b.record.year)
            .then(a.discovery_index.cmp(&b.discovery_index))
    });
    records.into_iter().map(|r| r.record).collect()
}
