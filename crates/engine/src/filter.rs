//! Package listing filters.
//!
//! A `PackageFilter` is a pure predicate: callers fetch the candidate rows,
//! the filter decides membership. It never touches storage.

use chrono::{DateTime, Utc};
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{EngineError, Package, PackageStatus, ResultEngine};

/// Filters for listing packages. All predicates AND-compose; an absent field
/// matches everything.
///
/// `from` and `to` bound `created_at` inclusively on both ends, in UTC.
#[derive(Clone, Debug, Default)]
pub struct PackageFilter {
    pub status: Option<PackageStatus>,
    /// Case- and diacritic-insensitive substring, matched against the package
    /// id, recipient name, recipient address, and owner email.
    pub search: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl PackageFilter {
    pub fn validate(&self) -> ResultEngine<()> {
        if let (Some(from), Some(to)) = (self.from, self.to)
            && from > to
        {
            return Err(EngineError::InvalidInput(
                "invalid range: from must be <= to".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether `package` passes every present predicate. `owner_email` is
    /// supplied by the caller since the package row only stores the owner id.
    pub fn matches(&self, package: &Package, owner_email: &str) -> bool {
        if let Some(status) = self.status
            && package.status != status
        {
            return false;
        }
        if let Some(from) = self.from
            && package.created_at < from
        {
            return false;
        }
        if let Some(to) = self.to
            && package.created_at > to
        {
            return false;
        }
        if let Some(search) = &self.search {
            let needle = fold_search_text(search);
            if needle.is_empty() {
                return true;
            }
            let haystacks = [
                package.id.to_string(),
                package.recipient_name.clone(),
                package.recipient_address.clone(),
                owner_email.to_string(),
            ];
            return haystacks
                .iter()
                .any(|text| fold_search_text(text).contains(&needle));
        }
        true
    }
}

/// Case fold plus diacritic strip, so "José" matches "jose".
fn fold_search_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        for lower in ch.to_lowercase() {
            out.push(lower);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::*;

    fn sample_package() -> Package {
        let mut package = Package::new(
            Uuid::new_v4(),
            "Maria Rossi".to_string(),
            "Via Garibaldi 42, Torino".to_string(),
            Decimal::new(15, 1),
            Uuid::new_v4(),
            Decimal::new(600, 2),
        )
        .unwrap();
        package.created_at = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        package
    }

    #[test]
    fn empty_filter_matches_everything() {
        let package = sample_package();
        assert!(PackageFilter::default().matches(&package, "maria@example.com"));
    }

    #[test]
    fn status_predicate_is_an_equality() {
        let package = sample_package();
        let filter = PackageFilter {
            status: Some(PackageStatus::Pending),
            ..Default::default()
        };
        assert!(filter.matches(&package, ""));
        let filter = PackageFilter {
            status: Some(PackageStatus::Delivered),
            ..Default::default()
        };
        assert!(!filter.matches(&package, ""));
    }

    #[test]
    fn search_spans_id_recipient_and_owner_email() {
        let package = sample_package();
        let by_name = PackageFilter {
            search: Some("garibaldi".to_string()),
            ..Default::default()
        };
        assert!(by_name.matches(&package, "maria@example.com"));

        let by_email = PackageFilter {
            search: Some("MARIA@EXAMPLE".to_string()),
            ..Default::default()
        };
        assert!(by_email.matches(&package, "maria@example.com"));

        let id_prefix: String = package.id.to_string().chars().take(8).collect();
        let by_id = PackageFilter {
            search: Some(id_prefix),
            ..Default::default()
        };
        assert!(by_id.matches(&package, ""));

        let miss = PackageFilter {
            search: Some("palermo".to_string()),
            ..Default::default()
        };
        assert!(!miss.matches(&package, "maria@example.com"));
    }

    #[test]
    fn search_folds_diacritics() {
        let mut package = sample_package();
        package.recipient_name = "José Álvarez".to_string();
        let filter = PackageFilter {
            search: Some("jose alv".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&package, ""));
    }

    #[test]
    fn date_range_is_inclusive_on_both_ends() {
        let package = sample_package();
        let exact = PackageFilter {
            from: Some(package.created_at),
            to: Some(package.created_at),
            ..Default::default()
        };
        assert!(exact.matches(&package, ""));

        let before = PackageFilter {
            to: Some(package.created_at - chrono::Duration::seconds(1)),
            ..Default::default()
        };
        assert!(!before.matches(&package, ""));

        let after = PackageFilter {
            from: Some(package.created_at + chrono::Duration::seconds(1)),
            ..Default::default()
        };
        assert!(!after.matches(&package, ""));
    }

    #[test]
    fn predicates_and_compose() {
        let package = sample_package();
        let filter = PackageFilter {
            status: Some(PackageStatus::Pending),
            search: Some("torino".to_string()),
            from: Some(package.created_at - chrono::Duration::days(1)),
            to: Some(package.created_at + chrono::Duration::days(1)),
        };
        assert!(filter.matches(&package, ""));

        let wrong_status = PackageFilter {
            status: Some(PackageStatus::Returned),
            ..filter
        };
        assert!(!wrong_status.matches(&package, ""));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let filter = PackageFilter {
            from: Some(Utc.with_ymd_and_hms(2026, 3, 11, 0, 0, 0).unwrap()),
            to: Some(Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap()),
            ..Default::default()
        };
        assert_eq!(
            filter.validate(),
            Err(EngineError::InvalidInput(
                "invalid range: from must be <= to".to_string()
            ))
        );
    }
}
