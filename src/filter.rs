use crate::models::{Job, JobStatus, JobType};

pub const PAGE_SIZE: usize = 5;

/// Search/filter/page state for the job list. Owned by the dashboard view;
/// the filtering functions only borrow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub search: String,
    pub job_type: Option<JobType>,
    pub status: Option<JobStatus>,
    /// 1-based page number.
    pub page: usize,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search: String::new(),
            job_type: None,
            status: None,
            page: 1,
        }
    }
}

impl FilterState {
    // Changing a predicate resets the page so a narrowed result set is never
    // left showing a blank out-of-range page. Page navigation itself never
    // gets clamped by the engine.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    pub fn set_job_type(&mut self, job_type: Option<JobType>) {
        self.job_type = job_type;
        self.page = 1;
    }

    pub fn set_status(&mut self, status: Option<JobStatus>) {
        self.status = status;
        self.page = 1;
    }

    pub fn next_page(&mut self, total_pages: usize) {
        if self.page < total_pages {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }
}

/// All jobs matching the active predicates, in the collection's own order.
/// Predicates are conjunctive; an unset filter never excludes.
pub fn filtered_jobs<'a>(jobs: &'a [Job], state: &FilterState) -> Vec<&'a Job> {
    let needle = state.search.to_lowercase();
    jobs.iter()
        .filter(|job| {
            job.company.to_lowercase().contains(&needle)
                && state.job_type.is_none_or(|t| job.job_type == t)
                && state.status.is_none_or(|s| job.status == s)
        })
        .collect()
}

/// The current page of the filtered set plus the total page count. A page
/// beyond the last one yields an empty slice rather than being clamped.
pub fn visible_jobs<'a>(jobs: &'a [Job], state: &FilterState) -> (Vec<&'a Job>, usize) {
    let matches = filtered_jobs(jobs, state);
    let total_pages = matches.len().div_ceil(PAGE_SIZE);
    let start = state.page.saturating_sub(1) * PAGE_SIZE;
    let page_items = matches.iter().skip(start).take(PAGE_SIZE).copied().collect();
    (page_items, total_pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(company: &str, job_type: JobType, status: JobStatus) -> Job {
        Job {
            id: format!("{}-{}-{}", company, job_type, status),
            company: company.to_string(),
            position: "Engineer".to_string(),
            status,
            job_type,
            interview_date: None,
        }
    }

    fn sample() -> Vec<Job> {
        vec![
            job("Acme", JobType::Remote, JobStatus::Pending),
            job("Globex", JobType::FullTime, JobStatus::Interview),
            job("Initech", JobType::Remote, JobStatus::Pending),
            job("Acme Labs", JobType::Internship, JobStatus::Declined),
            job("Hooli", JobType::PartTime, JobStatus::Accepted),
            job("Umbrella", JobType::Remote, JobStatus::Pending),
            job("Stark", JobType::FullTime, JobStatus::Pending),
        ]
    }

    #[test]
    fn test_page_never_exceeds_page_size() {
        let jobs = sample();
        let state = FilterState::default();
        let (page, total_pages) = visible_jobs(&jobs, &state);
        assert_eq!(page.len(), PAGE_SIZE);
        assert_eq!(total_pages, 2);
    }

    #[test]
    fn test_total_pages_is_ceiling_of_match_count() {
        let jobs = sample();
        let mut state = FilterState::default();
        // 7 matches -> 2 pages, second page holds the remainder.
        state.page = 2;
        let (page, total_pages) = visible_jobs(&jobs, &state);
        assert_eq!(total_pages, 2);
        assert_eq!(page.len(), 2);
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let jobs = sample();
        let state = FilterState {
            search: "acme".to_string(),
            job_type: Some(JobType::Remote),
            status: Some(JobStatus::Pending),
            page: 1,
        };
        let matches = filtered_jobs(&jobs, &state);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].company, "Acme");
    }

    #[test]
    fn test_unset_filters_never_exclude() {
        let jobs = sample();
        let state = FilterState::default();
        assert_eq!(filtered_jobs(&jobs, &state).len(), jobs.len());
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let jobs = sample();
        let mut state = FilterState::default();
        state.set_search("ACME");
        let matches = filtered_jobs(&jobs, &state);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].company, "Acme");
        assert_eq!(matches[1].company, "Acme Labs");
    }

    #[test]
    fn test_no_matches_yields_empty_page_and_zero_pages() {
        let jobs = sample();
        let mut state = FilterState::default();
        state.set_search("wonka");
        let (page, total_pages) = visible_jobs(&jobs, &state);
        assert!(page.is_empty());
        assert_eq!(total_pages, 0);
    }

    #[test]
    fn test_out_of_range_page_is_blank_not_clamped() {
        let jobs = sample();
        let state = FilterState {
            page: 5,
            ..FilterState::default()
        };
        let (page, total_pages) = visible_jobs(&jobs, &state);
        assert!(page.is_empty());
        assert_eq!(total_pages, 2);
    }

    #[test]
    fn test_changing_a_filter_resets_the_page() {
        let mut state = FilterState {
            page: 3,
            ..FilterState::default()
        };
        state.set_status(Some(JobStatus::Pending));
        assert_eq!(state.page, 1);

        state.page = 2;
        state.set_job_type(Some(JobType::Remote));
        assert_eq!(state.page, 1);

        state.page = 2;
        state.set_search("acme");
        assert_eq!(state.page, 1);
    }

    #[test]
    fn test_page_navigation_respects_bounds() {
        let mut state = FilterState::default();
        state.prev_page();
        assert_eq!(state.page, 1);
        state.next_page(2);
        assert_eq!(state.page, 2);
        state.next_page(2);
        assert_eq!(state.page, 2);
    }
}
