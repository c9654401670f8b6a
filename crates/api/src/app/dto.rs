use serde::{Deserialize, Serialize};

use jobcache_core::{DomainError, SubjectId};
use jobcache_jobs::{JobSnapshot, TierStats};

/// Query string of the job endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct JobQuery {
    #[serde(rename = "companyId")]
    pub company_id: Option<String>,
}

impl JobQuery {
    /// The subject to compute for; missing and empty ids are both rejected.
    pub fn subject(&self) -> Result<SubjectId, DomainError> {
        match self.company_id.as_deref() {
            Some(raw) => SubjectId::parse(raw)
                .map_err(|_| DomainError::validation("companyId is required")),
            None => Err(DomainError::validation("companyId is required")),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TierReport {
    #[serde(flatten)]
    pub stats: TierStats,
    /// Share of lookups served by an existing record.
    pub hit_ratio: f64,
    pub entries: Vec<JobSnapshot>,
}

impl TierReport {
    pub fn new(stats: TierStats, entries: Vec<JobSnapshot>) -> Self {
        let hit_ratio = stats.hit_ratio();
        Self {
            stats,
            hit_ratio,
            entries,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JobsReport {
    pub base: TierReport,
    pub derived: TierReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_empty_company_id_are_rejected() {
        let missing = JobQuery::default();
        let empty = JobQuery {
            company_id: Some(String::new()),
        };

        for query in [missing, empty] {
            let err = query.subject().unwrap_err();
            assert_eq!(err, DomainError::validation("companyId is required"));
        }
    }

    #[test]
    fn company_id_becomes_subject() {
        let query = JobQuery {
            company_id: Some("123".to_string()),
        };
        assert_eq!(query.subject().unwrap().as_str(), "123");
    }

    #[test]
    fn tier_report_flattens_stats_and_adds_hit_ratio() {
        let stats = TierStats {
            tier: "derived".to_string(),
            live: 1,
            hits: 4,
            misses: 1,
            ..TierStats::default()
        };

        let json = serde_json::to_value(TierReport::new(stats, Vec::new())).unwrap();
        assert_eq!(json["tier"], "derived");
        assert_eq!(json["hits"], 4);
        assert_eq!(json["hit_ratio"], 0.8);
        assert_eq!(json["entries"], serde_json::json!([]));
    }
}
