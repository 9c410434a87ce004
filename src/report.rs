use std::io::{self, Write};
use std::time::Duration;

use crate::node::Node;
use crate::query::Summary;

const CLOSED_PADDING: &str = "  ";
const OPEN_PADDING: &str = "│ ";
const PREFIX: &str = "├ ";
const PREFIX_LAST: &str = "└ ";

/// Render the tree with box-drawing prefixes, one node per line.
///
/// With `show_elapsed`, each line also carries the resolver time.
pub fn write_tree(w: &mut impl Write, root: &Node, show_elapsed: bool) -> io::Result<()> {
    write_line(w, "", root, show_elapsed)?;
    let mut closed = vec![true];
    write_children(w, root, &mut closed, show_elapsed)
}

fn write_children(
    w: &mut impl Write,
    node: &Node,
    closed: &mut Vec<bool>,
    show_elapsed: bool,
) -> io::Result<()> {
    for (i, child) in node.children.iter().enumerate() {
        let last = i + 1 == node.children.len();
        let mut prefix: String = closed
            .iter()
            .map(|&c| if c { CLOSED_PADDING } else { OPEN_PADDING })
            .collect();
        prefix.push_str(if last { PREFIX_LAST } else { PREFIX });
        write_line(w, &prefix, child, show_elapsed)?;

        closed.push(last);
        write_children(w, child, closed, show_elapsed)?;
        closed.pop();
    }
    Ok(())
}

fn write_line(
    w: &mut impl Write,
    prefix: &str,
    node: &Node,
    show_elapsed: bool,
) -> io::Result<()> {
    if show_elapsed {
        writeln!(w, "{prefix}{node:#}")
    } else {
        writeln!(w, "{prefix}{node}")
    }
}

/// Pretty-printed JSON with `name`, `internal`, `resolved`, and `deps`.
pub fn write_json(w: &mut impl Write, root: &Node) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *w, root)?;
    writeln!(w)
}

pub fn write_summary(w: &mut impl Write, summary: &Summary) -> io::Result<()> {
    writeln!(
        w,
        "{} dependencies ({} internal, {} external, {} testing) | max depth: {}",
        summary.total(),
        summary.internal,
        summary.external,
        summary.testing,
        summary.max_depth,
    )
}

/// One `a -> b -> c` line per path.
pub fn write_explain(w: &mut impl Write, paths: &[Vec<String>]) -> io::Result<()> {
    for path in paths {
        writeln!(w, "{}", path.join(" -> "))?;
    }
    Ok(())
}

pub fn format_elapsed(elapsed: Duration) -> String {
    let ms = elapsed.as_secs_f64() * 1000.0;
    if ms >= 1000.0 {
        format!("{:.2}s", ms / 1000.0)
    } else {
        format!("{ms:.1}ms")
    }
}
