use crate::models::{Job, JobType};

const GENERIC_TIP: &str = "Keep applying consistently and tracking your application status. \
                           Consider updating resumes for top roles.";

/// Heuristic next-step tips for the given (already filtered) collection.
///
/// Counting keeps explicit first-seen order so frequency ties always resolve
/// to the earliest-encountered entry. Output order: position tip, job-type
/// tip (remote or internship only), then the generic tip. An empty
/// collection yields only the generic tip.
pub fn suggestions(jobs: &[&Job]) -> Vec<String> {
    let mut role_counts: Vec<(String, usize)> = Vec::new();
    let mut type_counts: Vec<(JobType, usize)> = Vec::new();

    for job in jobs {
        bump(&mut role_counts, job.position.to_lowercase());
        bump(&mut type_counts, job.job_type);
    }

    let mut tips = Vec::new();

    if let Some(role) = first_max(&role_counts) {
        tips.push(format!(
            "You frequently applied for '{role}'. Consider similar roles like \
             \"{role} Intern\", \"Junior {role}\", or freelance work."
        ));
    }

    match first_max(&type_counts) {
        Some(JobType::Remote) => tips.push(
            "You prefer remote jobs. Explore platforms like RemoteOK, WeWorkRemotely, or AngelList."
                .to_string(),
        ),
        Some(JobType::Internship) => tips.push(
            "Since you apply for internships, check Internshala, LinkedIn internships, \
             and early-career roles."
                .to_string(),
        ),
        _ => {}
    }

    tips.push(GENERIC_TIP.to_string());
    tips
}

fn bump<K: PartialEq>(counts: &mut Vec<(K, usize)>, key: K) {
    match counts.iter_mut().find(|(k, _)| *k == key) {
        Some((_, n)) => *n += 1,
        None => counts.push((key, 1)),
    }
}

/// First entry holding the maximum count. Later entries only win with a
/// strictly greater count, so ties go to insertion order.
fn first_max<K>(counts: &[(K, usize)]) -> Option<&K> {
    let mut best: Option<(&K, usize)> = None;
    for (key, count) in counts {
        if best.is_none_or(|(_, max)| *count > max) {
            best = Some((key, *count));
        }
    }
    best.map(|(key, _)| key)
}
