//! Line-oriented diffing for textual artifacts

use crate::diffing::{Diffing, Divergence};

impl Diffing<String> {
    /// Contract for UTF-8 text compared line by line
    ///
    /// Serialization is the identity UTF-8 encoding. On mismatch the
    /// divergence message lists removed (`-`) and added (`+`) lines
    /// around the first point of difference.
    #[must_use]
    pub fn lines() -> Self {
        Self::new(
            |text: &String| text.clone().into_bytes(),
            |bytes| Ok(String::from_utf8(bytes.to_vec())?),
            |reference, fresh| {
                if reference == fresh {
                    None
                } else {
                    Some(Divergence::new(render_line_diff(reference, fresh)))
                }
            },
        )
    }
}

/// Render a minimal line diff between two texts
///
/// Common leading and trailing lines are elided; the differing middle
/// block is listed with `-` (reference) and `+` (fresh) markers. The
/// output is deterministic for fixed inputs.
#[must_use]
pub fn render_line_diff(reference: &str, fresh: &str) -> String {
    let old: Vec<&str> = reference.lines().collect();
    let new: Vec<&str> = fresh.lines().collect();

    // Identical line sequences from unequal texts: nothing to list, so
    // name the invisible difference instead of emitting an empty block.
    if old == new {
        return "snapshot does not match reference: texts differ only in a \
                trailing newline or trailing whitespace\n"
            .to_string();
    }

    let prefix = old
        .iter()
        .zip(&new)
        .take_while(|(a, b)| a == b)
        .count();

    let remaining = old.len().min(new.len()) - prefix;
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count()
        .min(remaining);

    let mut out = String::new();
    out.push_str(&format!(
        "snapshot does not match reference (first divergence at line {}):\n",
        prefix + 1
    ));
    for line in &old[prefix..old.len() - suffix] {
        out.push_str("- ");
        out.push_str(line);
        out.push('\n');
    }
    for line in &new[prefix..new.len() - suffix] {
        out.push_str("+ ");
        out.push_str(line);
        out.push('\n');
    }
    out
}
