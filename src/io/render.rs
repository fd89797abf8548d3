use crate::assignment::Assignment;
use crate::types::{ParticipantId, Roster};

use std::io::{self, Write};

pub const HEADER: &str = "This is the returned solution!";

/// Write one `giver -> receiver` line per participant, in participant order.
///
/// Participants missing from the roster are shown by id.
pub fn write_assignment<W: Write>(
    w: &mut W,
    assignment: &Assignment,
    roster: &Roster,
) -> io::Result<()> {
    for (giver, receiver) in assignment.edges() {
        writeln!(w, "{} -> {}", display(roster, giver), display(roster, receiver))?;
    }
    Ok(())
}

/// Header, blank line, then the assignment.
pub fn render(assignment: &Assignment, roster: &Roster) -> String {
    let mut out = Vec::new();
    // writing to a Vec cannot fail
    let _ = writeln!(out, "{HEADER}\n").and_then(|()| write_assignment(&mut out, assignment, roster));
    String::from_utf8_lossy(&out).into_owned()
}

fn display(roster: &Roster, id: ParticipantId) -> String {
    roster
        .name(id)
        .map(str::to_string)
        .unwrap_or_else(|| id.to_string())
}
