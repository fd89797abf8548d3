use crate::forbidden::ForbiddenPairSet;
use crate::generate::Error;
use crate::types::ParticipantId;

use tracing::debug;

/// Fast checks for inputs that admit no valid assignment at all.
///
/// Only necessary conditions are checked: passing does not guarantee that an assignment exists
/// when the forbidden pairs are not a union of groups.
pub(crate) fn nogood(forbidden: &ForbiddenPairSet, count: usize) -> Result<(), Error> {
    check(forbidden, count).inspect_err(|e| debug!(count, "rejected before drawing: {e}"))
}

fn check(forbidden: &ForbiddenPairSet, count: usize) -> Result<(), Error> {
    if count != forbidden.participant_count() {
        return Err(Error::CountMismatch {
            count,
            expected: forbidden.participant_count(),
        });
    }

    match count {
        0 => return Err(Error::NoParticipants),
        1 => return Err(Error::SingleParticipant),
        _ => {}
    }

    for p in (0..count).map(ParticipantId) {
        if forbidden.degree(p) == count - 1 {
            return Err(Error::Isolated(p));
        }
    }

    // A group of k needs k distinct recipients outside of itself.
    for component in components(forbidden) {
        let size = component.len();
        let is_group = component.iter().all(|&p| forbidden.degree(p) == size - 1);
        if is_group && size > count - size {
            return Err(Error::OversizedGroup {
                size,
                total: count,
                first: component[0],
            });
        }
    }

    Ok(())
}

/// Connected components of the forbidden graph, each sorted, ordered by smallest member.
fn components(forbidden: &ForbiddenPairSet) -> Vec<Vec<ParticipantId>> {
    let n = forbidden.participant_count();
    let mut visited = vec![false; n];
    let mut components = vec![];

    for start in 0..n {
        if visited[start] {
            continue;
        }
        visited[start] = true;

        let mut component = vec![];
        let mut stack = vec![ParticipantId(start)];
        while let Some(p) = stack.pop() {
            component.push(p);
            for q in forbidden.neighbours(p) {
                if !visited[q.0] {
                    visited[q.0] = true;
                    stack.push(q);
                }
            }
        }
        component.sort();
        components.push(component);
    }

    components
}
