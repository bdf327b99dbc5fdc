use crate::santa::Assignment;

/// Formats one pairing for console output.
pub fn format_assignment(assignment: &Assignment) -> String {
    format!(
        "{} <{}> -> {} <{}>",
        assignment.giver_name,
        assignment.giver_email,
        assignment.receiver_name,
        assignment.receiver_email
    )
}

/// Prints the generated pairings in roster order.
pub fn print_assignments(assignments: &[Assignment]) {
    println!("\n=== Secret Santa Assignments ===");
    println!("Total pairings: {}", assignments.len());
    for assignment in assignments {
        println!("  {}", format_assignment(assignment));
    }
}
