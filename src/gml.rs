//! Loading networks from GML (Graph Modelling Language) files.
//!
//! Only the parts of GML needed to describe an undirected network are interpreted: a single
//! top-level `graph` list, its `node`s (keyed by their integer `id`, with an optional `label`)
//! and its `edge`s (`source` and `target` ids). Every other attribute, nested lists included,
//! is parsed and ignored.
//!
//! ```
//! use blackout::gml;
//!
//! let network = gml::parse(r#"
//!     graph [
//!         node [ id 0 label "plant" ]
//!         node [ id 1 label "substation" ]
//!         edge [ source 0 target 1 ]
//!     ]
//! "#).unwrap();
//!
//! assert_eq!(network.graph.vertex_count(), 2);
//! assert_eq!(network.labels[&1], "substation");
//! ```

use std::{
    collections::{HashMap, HashSet},
    fs,
    path::Path,
};

use tracing::{debug, info, warn};

use crate::{
    edge::Edge,
    error::{Error, Result},
    graph::Graph,
};

/// Vertices of a loaded network are keyed by their GML `id`.
pub type NodeId = i64;

/// A network read from a GML document.
#[derive(Clone, Debug)]
pub struct Network {
    pub graph: Graph<NodeId>,
    /// Node labels, for the nodes that have one.
    pub labels: HashMap<NodeId, String>,
    /// The top-level `Creator` string, if present.
    pub creator: Option<String>,
}

impl Network {
    /// Returns the label of a vertex, falling back to its id.
    pub fn name(&self, id: NodeId) -> String {
        self.labels
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }
}

/// Reads and parses the GML file at `path`.
pub fn read(path: impl AsRef<Path>) -> Result<Network> {
    let path = path.as_ref();
    let input = fs::read_to_string(path)?;
    let network = parse(&input)?;

    info!(
        "loaded {} ({} vertices, {} edges)",
        path.display(),
        network.graph.vertex_count(),
        network.graph.edge_count()
    );

    Ok(network)
}

/// Parses a GML document.
pub fn parse(input: &str) -> Result<Network> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens: &tokens,
        position: 0,
    };
    let document = parser.list(false)?;

    let mut creator = None;
    let mut graphs = Vec::new();
    for (key, value) in document {
        match (key.as_str(), value) {
            ("graph", Value::List(list)) => graphs.push(list),
            ("graph", _) => return Err(Error::Gml("`graph` must be a list".into())),
            ("Creator", Value::Str(s)) => creator = Some(s),
            _ => {}
        }
    }

    let graph = match graphs.len() {
        0 => return Err(Error::Gml("no `graph` list found".into())),
        1 => graphs.remove(0),
        n => return Err(Error::Gml(format!("expected one `graph` list, found {n}"))),
    };

    let (graph, labels) = build(graph)?;

    Ok(Network {
        graph,
        labels,
        creator,
    })
}

//
// Interpretation
//

fn build(entries: Vec<(String, Value)>) -> Result<(Graph<NodeId>, HashMap<NodeId, String>)> {
    let mut multigraph = false;
    let mut nodes = Vec::new();
    let mut edges = Vec::new();

    for (key, value) in entries {
        match (key.as_str(), value) {
            ("directed", Value::Int(directed)) if directed != 0 => return Err(Error::Directed),
            ("multigraph", Value::Int(flag)) => multigraph = flag != 0,
            ("node", Value::List(list)) => nodes.push(list),
            ("edge", Value::List(list)) => edges.push(list),
            ("node" | "edge", _) => return Err(Error::Gml(format!("`{key}` must be a list"))),
            _ => {}
        }
    }

    let mut graph = Graph::new();
    let mut labels = HashMap::new();

    for node in nodes {
        let id = int_attribute(&node, "id", "node")?;
        if !graph.insert_vertex(id) {
            return Err(Error::DuplicateNode(id));
        }

        match find(&node, "label") {
            Some(Value::Str(label)) => {
                labels.insert(id, label.clone());
            }
            Some(Value::Int(label)) => {
                labels.insert(id, label.to_string());
            }
            Some(Value::Real(label)) => {
                labels.insert(id, label.to_string());
            }
            _ => {}
        }
    }

    let mut seen = HashSet::new();
    for edge in edges {
        let u = int_attribute(&edge, "source", "edge")?;
        let v = int_attribute(&edge, "target", "edge")?;

        if !graph.contains_vertex(&u) || !graph.contains_vertex(&v) {
            return Err(Error::UnknownNode { u, v });
        }

        if u == v {
            warn!("skipping self-loop on node {u}");
            continue;
        }

        if !seen.insert(Edge::new(u, v)) {
            if !multigraph {
                return Err(Error::DuplicateEdge { u, v });
            }
            debug!("collapsing parallel edge ({u}, {v})");
            continue;
        }

        graph.insert(Edge::new(u, v));
    }

    Ok((graph, labels))
}

fn find<'a>(entries: &'a [(String, Value)], key: &str) -> Option<&'a Value> {
    entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

fn int_attribute(entries: &[(String, Value)], key: &str, context: &str) -> Result<i64> {
    match find(entries, key) {
        Some(Value::Int(value)) => Ok(*value),
        Some(_) => Err(Error::Gml(format!("{context} `{key}` must be an integer"))),
        None => Err(Error::Gml(format!("{context} without `{key}`"))),
    }
}

//
// Parsing
//

#[derive(Clone, Debug, PartialEq)]
enum Value {
    Int(i64),
    Real(f64),
    Str(String),
    List(Vec<(String, Value)>),
}

struct Parser<'a> {
    tokens: &'a [(Token, usize)],
    position: usize,
}

impl<'a> Parser<'a> {
    fn next(&mut self) -> Option<&'a (Token, usize)> {
        let token = self.tokens.get(self.position);
        self.position += 1;
        token
    }

    fn last_line(&self) -> usize {
        self.tokens.last().map_or(1, |(_, line)| *line)
    }

    /// Parses `key value` pairs until a closing bracket, or the end of input at the top level.
    fn list(&mut self, nested: bool) -> Result<Vec<(String, Value)>> {
        let mut entries = Vec::new();

        loop {
            let (key, line) = match self.next() {
                Some((Token::Key(key), line)) => (key.clone(), *line),
                Some((Token::Close, _)) if nested => return Ok(entries),
                Some((token, line)) => {
                    return Err(Error::Parse {
                        line: *line,
                        message: format!("expected a key, found {token:?}"),
                    })
                }
                None if nested => {
                    return Err(Error::Parse {
                        line: self.last_line(),
                        message: "unclosed list".into(),
                    })
                }
                None => return Ok(entries),
            };

            let value = match self.next() {
                Some((Token::Int(i), _)) => Value::Int(*i),
                Some((Token::Real(r), _)) => Value::Real(*r),
                Some((Token::Str(s), _)) => Value::Str(s.clone()),
                Some((Token::Open, _)) => Value::List(self.list(true)?),
                Some((token, line)) => {
                    return Err(Error::Parse {
                        line: *line,
                        message: format!("expected a value for `{key}`, found {token:?}"),
                    })
                }
                None => {
                    return Err(Error::Parse {
                        line,
                        message: format!("missing value for `{key}`"),
                    })
                }
            };

            entries.push((key, value));
        }
    }
}

//
// Lexing
//

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Key(String),
    Int(i64),
    Real(f64),
    Str(String),
    Open,
    Close,
}

/// Splits the input into tokens, each paired with the line it starts on.
fn tokenize(input: &str) -> Result<Vec<(Token, usize)>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    let mut line = 1;

    while let Some(&c) = chars.peek() {
        match c {
            '\n' => {
                line += 1;
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            '#' => {
                while chars.next_if(|&c| c != '\n').is_some() {}
            }
            '[' => {
                tokens.push((Token::Open, line));
                chars.next();
            }
            ']' => {
                tokens.push((Token::Close, line));
                chars.next();
            }
            '"' => {
                let start = line;
                chars.next();

                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some(c) => {
                            if c == '\n' {
                                line += 1;
                            }
                            s.push(c);
                        }
                        None => {
                            return Err(Error::Parse {
                                line: start,
                                message: "unterminated string".into(),
                            })
                        }
                    }
                }

                tokens.push((Token::Str(unescape(&s)), start));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut key = String::new();
                while let Some(c) = chars.next_if(|c| c.is_ascii_alphanumeric() || *c == '_') {
                    key.push(c);
                }

                tokens.push((Token::Key(key), line));
            }
            c if c.is_ascii_digit() || matches!(c, '+' | '-' | '.') => {
                let mut literal = String::new();
                while let Some(c) =
                    chars.next_if(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
                {
                    literal.push(c);
                }

                tokens.push((number(&literal, line)?, line));
            }
            other => {
                return Err(Error::Parse {
                    line,
                    message: format!("unexpected character {other:?}"),
                })
            }
        }
    }

    Ok(tokens)
}

fn number(literal: &str, line: usize) -> Result<Token> {
    let invalid = || Error::Parse {
        line,
        message: format!("invalid number {literal:?}"),
    };

    if literal.contains(['.', 'e', 'E']) {
        literal.parse().map(Token::Real).map_err(|_| invalid())
    } else {
        literal.parse().map(Token::Int).map_err(|_| invalid())
    }
}

/// Resolves the character entities GML writers use to escape string content: the named XML
/// entities and numeric ones such as `&#233;` or `&#xE9;`. Anything else is left as is.
fn unescape(s: &str) -> String {
    if !s.contains('&') {
        return s.to_owned();
    }

    let mut unescaped = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find('&') {
        unescaped.push_str(&rest[..start]);
        let tail = &rest[start..];

        let resolved = tail
            .find(';')
            .and_then(|end| entity(&tail[1..end]).map(|c| (c, end)));
        match resolved {
            Some((c, end)) => {
                unescaped.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                unescaped.push('&');
                rest = &tail[1..];
            }
        }
    }
    unescaped.push_str(rest);

    unescaped
}

fn entity(name: &str) -> Option<char> {
    match name {
        "quot" => Some('"'),
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "apos" => Some('\''),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POWER_SAMPLE: &str = r#"Creator "Mark Newman on Thu Aug 31 12:59:09 2006"
graph
[
  directed 0
  node
  [
    id 0
    label "0"
  ]
  node
  [
    id 1
    label "1"
  ]
  node
  [
    id 2
    label "2"
  ]
  node
  [
    id 3
  ]
  edge
  [
    source 0
    target 1
  ]
  edge
  [
    source 0
    target 2
  ]
]
"#;

    #[test]
    fn tokens() {
        let tokens = tokenize("node [ id -3 x 1.5e2 # comment\n label \"a &amp; b\" ]").unwrap();
        let tokens: Vec<Token> = tokens.into_iter().map(|(t, _)| t).collect();

        assert_eq!(
            tokens,
            vec![
                Token::Key("node".into()),
                Token::Open,
                Token::Key("id".into()),
                Token::Int(-3),
                Token::Key("x".into()),
                Token::Real(150.0),
                Token::Key("label".into()),
                Token::Str("a & b".into()),
                Token::Close,
            ]
        );
    }

    #[test]
    fn entities() {
        assert_eq!(unescape("Z&#252;rich"), "Zürich");
        assert_eq!(unescape("&#x4E2D;&#X41;&lt;&apos;"), "中A<'");
        assert_eq!(unescape("no entities"), "no entities");
        // Unknown or malformed entities stay literal.
        let malformed = "&bogus; &#; &#xZZ; &#1114112; a & b";
        assert_eq!(unescape(malformed), malformed);
        assert_eq!(unescape("&&amp;"), "&&");

        let tokens = tokenize("label \"S&#227;o Paulo &amp; Rio\"").unwrap();
        assert_eq!(tokens[1].0, Token::Str("São Paulo & Rio".into()));
    }

    #[test]
    fn token_lines() {
        let tokens = tokenize("a 1\n\nb \"multi\nline\"\nc 2").unwrap();
        let lines: Vec<usize> = tokens.iter().map(|(_, line)| *line).collect();

        assert_eq!(lines, vec![1, 1, 3, 3, 5, 5]);
    }

    #[test]
    fn power_grid_sample() {
        let mut network = parse(POWER_SAMPLE).unwrap();

        assert_eq!(
            network.creator.as_deref(),
            Some("Mark Newman on Thu Aug 31 12:59:09 2006")
        );
        assert_eq!(network.graph.vertices(), vec![0, 1, 2, 3]);
        assert_eq!(network.graph.edge_count(), 2);
        assert!(network.graph.contains(&Edge::new(2, 0)));

        assert_eq!(network.name(2), "2");
        // Unlabelled nodes fall back to their id.
        assert_eq!(network.name(3), "3");
    }

    #[test]
    fn nested_attributes_are_ignored() {
        let network = parse(
            "graph [ node [ id 1 graphics [ x 1.0 y 2.0 fill \"#ff0000\" ] ] \
             node [ id 2 ] edge [ source 1 target 2 weight 0.5 ] ]",
        )
        .unwrap();

        assert_eq!(network.graph.edge_count(), 1);
    }

    #[test]
    fn directed_is_rejected() {
        assert!(matches!(
            parse("graph [ directed 1 node [ id 1 ] ]"),
            Err(Error::Directed)
        ));
    }

    #[test]
    fn missing_graph() {
        assert!(matches!(parse("Creator \"me\""), Err(Error::Gml(_))));
        assert!(matches!(parse("graph [ ] graph [ ]"), Err(Error::Gml(_))));
    }

    #[test]
    fn node_errors() {
        assert!(matches!(
            parse("graph [ node [ id 1 ] node [ id 1 ] ]"),
            Err(Error::DuplicateNode(1))
        ));
        assert!(matches!(
            parse("graph [ node [ label \"x\" ] ]"),
            Err(Error::Gml(_))
        ));
        assert!(matches!(
            parse("graph [ node [ id \"x\" ] ]"),
            Err(Error::Gml(_))
        ));
    }

    #[test]
    fn edge_errors() {
        assert!(matches!(
            parse("graph [ node [ id 1 ] edge [ source 1 target 2 ] ]"),
            Err(Error::UnknownNode { u: 1, v: 2 })
        ));
        assert!(matches!(
            parse(
                "graph [ node [ id 1 ] node [ id 2 ] \
                 edge [ source 1 target 2 ] edge [ source 2 target 1 ] ]"
            ),
            Err(Error::DuplicateEdge { u: 2, v: 1 })
        ));
    }

    #[test]
    fn multigraph_collapses_parallel_edges() {
        let network = parse(
            "graph [ multigraph 1 node [ id 1 ] node [ id 2 ] \
             edge [ source 1 target 2 ] edge [ source 1 target 2 ] ]",
        )
        .unwrap();

        assert_eq!(network.graph.edge_count(), 1);
    }

    #[test]
    fn self_loops_are_skipped() {
        let network = parse("graph [ node [ id 1 ] edge [ source 1 target 1 ] ]").unwrap();

        assert_eq!(network.graph.vertex_count(), 1);
        assert_eq!(network.graph.edge_count(), 0);
    }

    #[test]
    fn syntax_errors() {
        assert!(matches!(
            parse("graph [\n node [ id 1 ]\n"),
            Err(Error::Parse { line: 2, .. })
        ));
        assert!(matches!(
            parse("graph [ node [ id 1 ] ]\n]"),
            Err(Error::Parse { line: 2, .. })
        ));
        assert!(matches!(
            parse("graph [ node [ id 1 ] ] label"),
            Err(Error::Parse { line: 1, .. })
        ));
        assert!(matches!(
            parse("graph [ \"stray\" ]"),
            Err(Error::Parse { .. })
        ));
        assert!(matches!(
            parse("graph [ node [ id 1-2 ] ]"),
            Err(Error::Parse { .. })
        ));
        assert!(matches!(parse("graph { }"), Err(Error::Parse { .. })));
    }

    #[test]
    fn read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("power.gml");
        fs::write(&path, POWER_SAMPLE).unwrap();

        let network = read(&path).unwrap();
        assert_eq!(network.graph.vertex_count(), 4);

        assert!(matches!(
            read(dir.path().join("missing.gml")),
            Err(Error::Io(_))
        ));
    }
}
