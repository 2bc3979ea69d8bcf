//! Tree view of a whole record, used by all-data output and debug dumps.

use crate::project::ReportOptions;
use crate::readability::Readability;
use bpreport_core::{Attempt, JobRecord};

/// A named value in the tree.
enum Node<'a> {
    Value(&'a str),
    List(&'a [String]),
    Attempt(&'a Attempt),
}

/// Render every decoded value of a record.
///
/// Top-level names (columns, `filelist`, `tryN`) are sorted together and
/// printed flush left; nested values are indented one tab per level. With
/// `verbose` set, scalar values go through readability.
pub fn dump_record(record: &JobRecord, options: &ReportOptions) -> String {
    let readability = options.readability();

    let mut nodes: Vec<(String, Node)> = record
        .labelled()
        .map(|(name, value)| (name.to_string(), Node::Value(value)))
        .collect();
    if let Some(count) = record.try_count.as_deref() {
        nodes.push(("trycount".to_string(), Node::Value(count)));
    }
    if !record.file_list.is_empty() {
        nodes.push(("filelist".to_string(), Node::List(&record.file_list)));
    }
    nodes.extend(
        record
            .attempts
            .iter()
            .map(|attempt| (format!("try{}", attempt.index), Node::Attempt(attempt))),
    );

    let mut out = format!("{} {{\n", record.job_id());
    push_nodes(&mut out, nodes, 0, readability.as_ref());
    out.push_str(&format!("}}*** END {} ***\n", record.job_id()));
    out
}

fn attempt_nodes(attempt: &Attempt) -> Vec<(String, Node<'_>)> {
    let mut nodes: Vec<(String, Node)> = attempt
        .labelled()
        .map(|(name, value)| (name.to_string(), Node::Value(value)))
        .collect();
    if !attempt.status_lines.is_empty() {
        nodes.push(("trystatuslines".to_string(), Node::List(&attempt.status_lines)));
    }
    nodes
}

fn push_nodes(
    out: &mut String,
    mut nodes: Vec<(String, Node)>,
    depth: usize,
    readability: Option<&Readability>,
) {
    nodes.sort_by(|(a, _), (b, _)| a.cmp(b));
    let indent = "\t".repeat(depth);

    for (name, node) in nodes {
        match node {
            Node::Value(value) => {
                let value = match readability {
                    Some(r) => r.apply(&name, value),
                    None => value.into(),
                };
                out.push_str(&format!("{indent}{name} : {value}\n"));
            }
            Node::List(items) => {
                out.push_str(&format!("{indent}{name} {{\n"));
                for item in items {
                    out.push_str(&format!("{indent}\t{item}\n"));
                }
                out.push_str(&format!("{indent}}}\n"));
            }
            // Nested blocks open and close flush left.
            Node::Attempt(attempt) => {
                out.push_str(&format!("{name} {{\n"));
                push_nodes(out, attempt_nodes(attempt), depth + 1, readability);
                out.push_str("}\n");
            }
        }
    }
}
