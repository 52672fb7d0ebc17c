// ── Corefile rendering ──
//
// The base zone is a fixed skeleton with a single substitution point for
// the upstream resolver. Extra server blocks are appended as-is.

use std::fmt;

use crate::config::CharmConfig;

/// Location of the Corefile inside the workload container.
pub const COREFILE_PATH: &str = "/etc/coredns/Corefile";

const FORWARD_PLACEHOLDER: &str = "{forward}";

/// Base server block. `{forward}` is replaced by the configured resolver.
pub const BASE_TEMPLATE: &str = "\
.:53 {
    errors
    health {
      lameduck 5s
    }
    ready
    kubernetes cluster.local in-addr.arpa ip6.arpa {
      fallthrough in-addr.arpa ip6.arpa
    }
    prometheus :9153
    forward . {forward}
    cache 30
    loop
    reload
    loadbalance
}
";

/// Render the full Corefile for `config`.
///
/// The base block always ends with a newline, so a single extra `\n`
/// leaves exactly one blank line before `extra_servers`.
pub fn render(config: &CharmConfig) -> String {
    let mut corefile = BASE_TEMPLATE.replace(FORWARD_PLACEHOLDER, &config.forward);
    if !config.extra_servers.is_empty() {
        corefile.push('\n');
        corefile.push_str(&config.extra_servers);
    }
    corefile
}

// ── Linting ──────────────────────────────────────────────────────────

/// A structural problem found in a block of server stanzas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LintIssue {
    /// A `}` with no matching `{`.
    UnexpectedClose { line: usize },
    /// Blocks still open at end of input.
    Unclosed { depth: usize },
}

impl fmt::Display for LintIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedClose { line } => write!(f, "line {line}: unexpected '}}'"),
            Self::Unclosed { depth } => write!(f, "{depth} block(s) left unclosed"),
        }
    }
}

/// Check brace balance of a server block, ignoring `#` comments.
///
/// This only catches structural mistakes; plugin names and arguments are
/// left for CoreDNS to reject when it reloads.
pub fn lint(block: &str) -> Vec<LintIssue> {
    let mut issues = Vec::new();
    let mut depth = 0usize;

    for (idx, raw) in block.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or_default();
        for ch in line.chars() {
            match ch {
                '{' => depth += 1,
                '}' if depth == 0 => issues.push(LintIssue::UnexpectedClose { line: idx + 1 }),
                '}' => depth -= 1,
                _ => {}
            }
        }
    }

    if depth > 0 {
        issues.push(LintIssue::Unclosed { depth });
    }
    issues
}
