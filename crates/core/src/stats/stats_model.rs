use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engagement::Attendance;
use crate::roles::{RoleKind, RoleRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastStats {
    pub broadcast_id: String,
    pub hosts: i64,
    pub participants: i64,
    pub invitees: i64,
    pub rsvps: i64,
    pub attendees: i64,
    pub questions: i64,
    pub answers: i64,
    pub files: i64,
    pub average_rating: Option<f64>,
    pub updated_at: DateTime<Utc>,
}

impl BroadcastStats {
    pub fn empty(broadcast_id: &str) -> Self {
        Self {
            broadcast_id: broadcast_id.to_string(),
            hosts: 0,
            participants: 0,
            invitees: 0,
            rsvps: 0,
            attendees: 0,
            questions: 0,
            answers: 0,
            files: 0,
            average_rating: None,
            updated_at: Utc::now(),
        }
    }

    /// Equality over the counted values only.
    pub fn same_counts(&self, other: &BroadcastStats) -> bool {
        self.broadcast_id == other.broadcast_id
            && self.hosts == other.hosts
            && self.participants == other.participants
            && self.invitees == other.invitees
            && self.rsvps == other.rsvps
            && self.attendees == other.attendees
            && self.questions == other.questions
            && self.answers == other.answers
            && self.files == other.files
            && self.average_rating == other.average_rating
    }
}

/// Computes stats from the full current state of a broadcast.
pub fn aggregate(
    broadcast_id: &str,
    roles: &[RoleRecord],
    attendance: &[Attendance],
    questions: i64,
    answers: i64,
    files: usize,
) -> BroadcastStats {
    let count = |role: RoleKind| roles.iter().filter(|r| r.role == role).count() as i64;
    let ratings: Vec<f64> = attendance
        .iter()
        .filter_map(|a| a.rating.map(f64::from))
        .collect();
    let average_rating =
        (!ratings.is_empty()).then(|| ratings.iter().sum::<f64>() / ratings.len() as f64);

    BroadcastStats {
        broadcast_id: broadcast_id.to_string(),
        hosts: count(RoleKind::Host),
        participants: count(RoleKind::Participant),
        invitees: count(RoleKind::Invitee),
        rsvps: count(RoleKind::Rsvp),
        attendees: attendance.len() as i64,
        questions,
        answers,
        files: files as i64,
        average_rating,
        updated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::{EmailStatus, Holder, RoleOrigin};

    fn record(id: &str, role: RoleKind) -> RoleRecord {
        RoleRecord {
            id: id.into(),
            broadcast_id: "b1".into(),
            role,
            holder: Holder::internal(id),
            origin: RoleOrigin::Requested,
            sequence_id: None,
            is_mail_sent: false,
            email_status: EmailStatus::NotSent,
            conference_url: None,
            invitee_status: None,
            created_at: Utc::now(),
        }
    }

    fn attendance(id: &str, rating: Option<i32>) -> Attendance {
        Attendance {
            id: id.into(),
            broadcast_id: "b1".into(),
            user_id: id.into(),
            joined_at: Utc::now(),
            rating,
        }
    }

    #[test]
    fn test_aggregate_counts_roles_and_averages_non_null_ratings() {
        let roles = vec![
            record("h1", RoleKind::Host),
            record("h2", RoleKind::Host),
            record("p1", RoleKind::Participant),
            record("i1", RoleKind::Invitee),
            record("r1", RoleKind::Rsvp),
            record("r2", RoleKind::Rsvp),
        ];
        let attendance = vec![
            attendance("a1", Some(5)),
            attendance("a2", Some(2)),
            attendance("a3", None),
        ];

        let stats = aggregate("b1", &roles, &attendance, 4, 3, 2);

        assert_eq!(stats.hosts, 2);
        assert_eq!(stats.participants, 1);
        assert_eq!(stats.invitees, 1);
        assert_eq!(stats.rsvps, 2);
        assert_eq!(stats.attendees, 3);
        assert_eq!(stats.questions, 4);
        assert_eq!(stats.answers, 3);
        assert_eq!(stats.files, 2);
        assert_eq!(stats.average_rating, Some(3.5));
    }

    #[test]
    fn test_aggregate_without_ratings_has_no_average() {
        let stats = aggregate("b1", &[], &[attendance("a1", None)], 0, 0, 0);
        assert_eq!(stats.average_rating, None);
        assert_eq!(stats.attendees, 1);
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let roles = vec![record("h1", RoleKind::Host)];
        let first = aggregate("b1", &roles, &[], 1, 1, 1);
        let second = aggregate("b1", &roles, &[], 1, 1, 1);
        assert!(first.same_counts(&second));
    }
}
