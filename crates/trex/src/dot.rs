//! Graphviz rendering for automata

use std::{
    borrow::Cow,
    collections::BTreeMap,
    fmt::{self, Display},
};

use indexmap::IndexMap;

macro_rules! attr {
    ($id:ident, $name:literal) => {
        pub fn $id<S: Into<Cow<'a, str>>>(&mut self, $id: S) {
            self.attrs.insert($name, $id.into());
        }
    };
}

/// Human-readable label for an edge symbol, with `None` meaning epsilon
#[must_use]
pub fn symbol_label(sym: Option<u8>) -> Cow<'static, str> {
    let Some(sym) = sym else {
        return "ϵ".into();
    };

    let s = sym.escape_ascii().to_string();
    if s.len() == s.trim().len() {
        s.into()
    } else {
        format!("'{s}'").into()
    }
}

#[derive(Debug)]
pub struct Graph<'a> {
    attrs: BTreeMap<&'static str, Cow<'a, str>>,
    nodes: IndexMap<Cow<'a, str>, Node<'a>>,
    edges: IndexMap<(Cow<'a, str>, Cow<'a, str>), Vec<Edge<'a>>>,
}

impl Default for Graph<'_> {
    fn default() -> Self { Self::new() }
}

impl<'a> Graph<'a> {
    attr!(rankdir, "rankdir");

    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self {
            attrs: BTreeMap::new(),
            nodes: IndexMap::new(),
            edges: IndexMap::new(),
        }
    }

    #[inline]
    pub fn node<S: Into<Cow<'a, str>>>(&mut self, id: S) -> &mut Node<'a> {
        self.nodes.entry(id.into()).or_default()
    }

    #[inline]
    pub fn edge<L: Into<Cow<'a, str>>, R: Into<Cow<'a, str>>>(
        &mut self,
        l: L,
        r: R,
    ) -> &mut Edge<'a> {
        let l = l.into();
        let r = r.into();
        self.node(l.clone());
        self.node(r.clone());
        let edges = self.edges.entry((l, r)).or_default();
        edges.push(Edge::default());
        edges.last_mut().unwrap_or_else(|| unreachable!())
    }

    /// Lay out a state machine given each state's id, whether it accepts, and
    /// its outgoing `(symbol, destination)` edges
    pub(crate) fn state_machine<
        IN: IntoIterator<Item = (usize, bool, IE)>,
        IE: IntoIterator<Item = (Option<u8>, usize)>,
    >(
        nodes: IN,
        start: usize,
    ) -> Self {
        let mut graph = Self::new();
        graph.rankdir("LR");

        for (state, accept, edges) in nodes {
            let id = Cow::from(state.to_string());
            let node = graph.node(id.clone());
            node.label(id.clone());

            if accept {
                node.border_count("2");
            }

            for (sym, next_state) in edges {
                graph
                    .edge(id.clone(), next_state.to_string())
                    .label(symbol_label(sym));
            }
        }

        let start_id = Cow::from("_start");
        let start_node = graph.node(start_id.clone());
        start_node.style("invis");
        start_node.shape("point");
        start_node.label("");
        graph.edge(start_id, start.to_string());

        graph
    }
}

#[derive(Default)]
struct AttrState {
    any: bool,
}

impl AttrState {
    fn write_one(
        &mut self,
        f: &mut fmt::Formatter,
        key: &'static str,
        val: impl FnOnce(&mut fmt::Formatter) -> fmt::Result,
    ) -> fmt::Result {
        f.write_str(if self.any {
            ","
        } else {
            self.any = true;
            "["
        })?;

        f.write_str(key)?;
        f.write_str("=")?;
        val(f)
    }

    fn write_all(
        f: &mut fmt::Formatter,
        attrs: &BTreeMap<&'static str, Cow<'_, str>>,
    ) -> fmt::Result {
        let mut state = Self::default();

        for (key, val) in attrs {
            state.write_one(f, key, |f| write!(f, "{val:?}"))?;
        }

        if state.any {
            f.write_str("]")
        } else {
            Ok(())
        }
    }
}

impl Display for Graph<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let Self {
            attrs,
            nodes,
            edges,
        } = self;

        f.write_str("digraph {")?;

        for (key, val) in attrs {
            write!(f, "{key}={val:?};")?;
        }

        for (id, Node { attrs }) in nodes {
            write!(f, "{id:?}")?;
            AttrState::write_all(f, attrs)?;
            f.write_str(";")?;
        }

        for ((l, r), edges) in edges {
            for Edge { attrs } in edges {
                write!(f, "{l:?}->{r:?}")?;
                AttrState::write_all(f, attrs)?;
                f.write_str(";")?;
            }
        }

        f.write_str("}")
    }
}

#[derive(Debug, Default)]
pub struct Node<'a> {
    attrs: BTreeMap<&'static str, Cow<'a, str>>,
}

impl<'a> Node<'a> {
    attr!(style, "style");

    attr!(shape, "shape");

    attr!(label, "label");

    attr!(border_count, "peripheries");
}

#[derive(Debug, Default)]
pub struct Edge<'a> {
    attrs: BTreeMap<&'static str, Cow<'a, str>>,
}

impl<'a> Edge<'a> {
    attr!(label, "label");
}

#[cfg(test)]
mod test {
    use super::{Graph, symbol_label};

    #[test]
    fn labels() {
        assert_eq!(symbol_label(None), "ϵ");
        assert_eq!(symbol_label(Some(b'a')), "a");
        assert_eq!(symbol_label(Some(b'"')), "\\\"");
        assert_eq!(symbol_label(Some(b'\n')), "\\n");
        assert_eq!(symbol_label(Some(b' ')), "' '");
    }

    #[test]
    fn render() {
        let graph = Graph::state_machine(
            [(0, false, vec![(Some(b'a'), 1)]), (1, true, vec![(None, 0)])],
            0,
        );

        assert_eq!(
            graph.to_string(),
            "digraph {rankdir=\"LR\";\"0\"[label=\"0\"];\"1\"[label=\"1\",peripheries=\"2\"];\
             \"_start\"[label=\"\",shape=\"point\",style=\"invis\"];\
             \"0\"->\"1\"[label=\"a\"];\"1\"->\"0\"[label=\"ϵ\"];\"_start\"->\"0\";}",
        );
    }
}
