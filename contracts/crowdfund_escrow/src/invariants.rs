#![allow(dead_code)]

extern crate std;

use soroban_sdk::Address;

use crate::types::{Project, ProjectStatus};

/// INV-1: Funded total must never be negative.
pub fn assert_total_non_negative(project: &Project) {
    assert!(
        project.total_funded >= 0,
        "INV-1 violated: project {} has negative total ({})",
        project.id,
        project.total_funded
    );
}

/// INV-2: Project goal must always be positive.
pub fn assert_goal_positive(project: &Project) {
    assert!(
        project.goal > 0,
        "INV-2 violated: project {} has non-positive goal ({})",
        project.id,
        project.goal
    );
}

/// INV-3: Project deadline must be positive.
pub fn assert_deadline_positive(project: &Project) {
    assert!(
        project.deadline > 0,
        "INV-3 violated: project {} has zero deadline",
        project.id
    );
}

/// INV-4: `total_funded` equals the sum of every backer's unrefunded
/// contribution. `contributions` must list every backer that ever funded it.
pub fn assert_total_matches_contributions(project: &Project, contributions: &[(Address, i128)]) {
    let sum: i128 = contributions.iter().map(|(_, amount)| *amount).sum();
    assert_eq!(
        project.total_funded, sum,
        "INV-4 violated: project {} total {} != sum of contributions {}",
        project.id, project.total_funded, sum
    );
}

/// INV-5: Contribution invariant: after contributing `amount`, the total
/// increases by exactly `amount`.
pub fn assert_contribution_invariant(total_before: i128, total_after: i128, amount: i128) {
    assert_eq!(
        total_after,
        total_before + amount,
        "INV-5 violated: contribution invariant broken: {} + {} != {}",
        total_before,
        amount,
        total_after
    );
}

/// INV-6: Project IDs are sequential starting from 0.
pub fn assert_sequential_ids(projects: &[Project]) {
    for (i, project) in projects.iter().enumerate() {
        assert_eq!(
            project.id, i as u64,
            "INV-6 violated: expected id {}, got {}",
            i, project.id
        );
    }
}

/// INV-7: Status transition validity. Only these moves are possible:
///   Open       -> GoalMet | GoalNotMet
///   GoalMet    -> Released
///   GoalNotMet -> GoalMet (late contributions)
///   Released   -> (none)
pub fn assert_valid_status_transition(from: &ProjectStatus, to: &ProjectStatus) {
    if from == to {
        return;
    }
    let valid = matches!(
        (from, to),
        (ProjectStatus::Open, ProjectStatus::GoalMet)
            | (ProjectStatus::Open, ProjectStatus::GoalNotMet)
            | (ProjectStatus::GoalMet, ProjectStatus::Released)
            | (ProjectStatus::GoalNotMet, ProjectStatus::GoalMet)
    );

    assert!(
        valid,
        "INV-7 violated: invalid status transition from {:?} to {:?}",
        from, to
    );
}

/// INV-8: Fields fixed at registration never change.
pub fn assert_project_immutable_fields(original: &Project, current: &Project) {
    assert_eq!(original.id, current.id, "INV-8 violated: project id changed");
    assert_eq!(
        original.creator, current.creator,
        "INV-8 violated: project creator changed"
    );
    assert_eq!(
        original.name, current.name,
        "INV-8 violated: project name changed"
    );
    assert_eq!(
        original.token, current.token,
        "INV-8 violated: project token changed"
    );
    assert_eq!(
        original.goal, current.goal,
        "INV-8 violated: project goal changed"
    );
    assert_eq!(
        original.deadline, current.deadline,
        "INV-8 violated: project deadline changed"
    );
}

/// INV-9: `funds_released` never goes back to false.
pub fn assert_release_permanent(before: &Project, after: &Project) {
    assert!(
        !before.funds_released || after.funds_released,
        "INV-9 violated: project {} un-released",
        after.id
    );
}

/// Run all stateless project invariants.
pub fn assert_all_project_invariants(project: &Project) {
    assert_total_non_negative(project);
    assert_goal_positive(project);
    assert_deadline_positive(project);
}
