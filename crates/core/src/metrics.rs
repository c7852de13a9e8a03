//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 handler는 이 상수를 사용하여 `metrics::counter!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `sbomkit_`
//! - handler명: `pnpm_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(sbomkit_core::metrics::PNPM_MODULES_RESOLVED_TOTAL).increment(1);
//! ```

use metrics::{describe_counter, describe_histogram};

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 관계 레이블 키 (direct, transitive)
pub const LABEL_RELATIONSHIP: &str = "relationship";

/// lockfile 버전 레이블 키 (5, 6, 9)
pub const LABEL_LOCKFILE_VERSION: &str = "lockfile_version";

// ─── pnpm handler 메트릭 ──────────────────────────────────────────

/// pnpm: 파싱된 lockfile 수 (counter, label: lockfile_version)
pub const PNPM_LOCKFILES_PARSED_TOTAL: &str = "sbomkit_pnpm_lockfiles_parsed_total";

/// pnpm: 해석된 모듈 수 (counter, label: relationship)
pub const PNPM_MODULES_RESOLVED_TOTAL: &str = "sbomkit_pnpm_modules_resolved_total";

/// pnpm: 설치 모듈에 대응시키지 못한 의존성 수 (counter)
pub const PNPM_RESOLUTION_GAPS_TOTAL: &str = "sbomkit_pnpm_resolution_gaps_total";

/// pnpm: 모듈 매니페스트 읽기 실패 수 (counter)
pub const PNPM_MANIFEST_READ_FAILURES_TOTAL: &str = "sbomkit_pnpm_manifest_read_failures_total";

/// pnpm: 의존성 트리 해석 소요 시간 (histogram, 초)
pub const PNPM_RESOLVE_DURATION_SECONDS: &str = "sbomkit_pnpm_resolve_duration_seconds";

/// 모든 메트릭의 설명을 등록합니다.
///
/// recorder가 설치된 뒤 한 번 호출합니다. recorder가 없으면 아무 일도 하지 않습니다.
pub fn describe_metrics() {
    describe_counter!(
        PNPM_LOCKFILES_PARSED_TOTAL,
        "Total number of pnpm lockfiles parsed"
    );
    describe_counter!(
        PNPM_MODULES_RESOLVED_TOTAL,
        "Total number of modules resolved from pnpm dependency trees"
    );
    describe_counter!(
        PNPM_RESOLUTION_GAPS_TOTAL,
        "Total number of dependencies that could not be matched to an installed module"
    );
    describe_counter!(
        PNPM_MANIFEST_READ_FAILURES_TOTAL,
        "Total number of installed package manifests that could not be read"
    );
    describe_histogram!(
        PNPM_RESOLVE_DURATION_SECONDS,
        "Time to resolve a full pnpm dependency tree in seconds"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_METRIC_NAMES: &[&str] = &[
        PNPM_LOCKFILES_PARSED_TOTAL,
        PNPM_MODULES_RESOLVED_TOTAL,
        PNPM_RESOLUTION_GAPS_TOTAL,
        PNPM_MANIFEST_READ_FAILURES_TOTAL,
        PNPM_RESOLVE_DURATION_SECONDS,
    ];

    #[test]
    fn all_metrics_start_with_sbomkit_prefix() {
        for name in ALL_METRIC_NAMES {
            assert!(
                name.starts_with("sbomkit_"),
                "Metric '{}' does not start with 'sbomkit_' prefix",
                name
            );
        }
    }

    #[test]
    fn counters_end_with_total_suffix() {
        for name in ALL_METRIC_NAMES.iter().filter(|n| !n.ends_with("_seconds")) {
            assert!(name.ends_with("_total"), "counter '{}' lacks _total", name);
        }
    }

    #[test]
    fn metric_names_are_unique() {
        let mut names = ALL_METRIC_NAMES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ALL_METRIC_NAMES.len());
    }

    #[test]
    fn describe_metrics_without_recorder_is_noop() {
        describe_metrics();
    }
}
