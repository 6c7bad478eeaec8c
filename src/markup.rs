//! HTML rendering of the results container.
//!
//! Markup is built as a small node tree and serialized in one place, so every
//! text node and attribute value goes through `escape_html` exactly once.

use chrono::{DateTime, Utc};

use crate::constants::constants;
use crate::format::escape_html;
use crate::model::SearchResult;
use crate::view::{self, CardAction, LOADING_TEXT, NO_RESULTS_TEXT, ResultsView};

enum Node {
  Element { tag: &'static str, attrs: Vec<(&'static str, String)>, children: Vec<Node> },
  Text(String),
}

impl Node {
  fn el(tag: &'static str, class: &str) -> Self {
    let attrs = if class.is_empty() { Vec::new() } else { vec![("class", class.to_string())] };
    Node::Element { tag, attrs, children: Vec::new() }
  }

  fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
    if let Node::Element { attrs, .. } = &mut self {
      attrs.push((name, value.into()));
    }
    self
  }

  fn child(mut self, node: Node) -> Self {
    if let Node::Element { children, .. } = &mut self {
      children.push(node);
    }
    self
  }

  fn text(self, text: impl Into<String>) -> Self {
    self.child(Node::Text(text.into()))
  }

  fn render(&self, out: &mut String) {
    match self {
      Node::Text(text) => out.push_str(&escape_html(text)),
      Node::Element { tag, attrs, children } => {
        out.push('<');
        out.push_str(tag);
        for (name, value) in attrs {
          out.push_str(&format!(" {}=\"{}\"", name, escape_html(value)));
        }
        out.push('>');
        for child in children {
          child.render(out);
        }
        out.push_str(&format!("</{}>", tag));
      }
    }
  }
}

fn icon(class: &str) -> Node {
  Node::el("i", &format!("fas {}", class))
}

fn state_message(icon_class: &str, message: &str) -> Node {
  Node::el("div", "empty-state").child(icon(icon_class)).child(Node::el("p", "").text(message))
}

fn action_button(result: &SearchResult, action: CardAction) -> Node {
  match action {
    CardAction::Download if result.external => {
      let button = Node::el("button", "btn-download").attr("data-action", "download-external");
      let button = match &result.download_url {
        Some(url) => button.attr("data-download-url", url.as_str()),
        None => button,
      };
      let filename = result.filename.clone().unwrap_or_else(|| format!("{}.srt", result.title));
      button.attr("data-filename", filename).child(icon("fa-download")).text(" Download")
    }
    CardAction::Download => {
      let button = Node::el("button", "btn-download").attr("data-action", "download");
      let button = match result.id {
        Some(id) => button.attr("data-id", id.to_string()),
        None => button,
      };
      button.child(icon("fa-download")).text(" Download")
    }
    CardAction::Import => {
      let button = Node::el("button", "btn-import")
        .attr("data-action", "import")
        .attr("data-url", result.external_url.clone().unwrap_or_default())
        .attr("data-title", result.title.as_str())
        .attr("data-language", result.language.clone().unwrap_or_else(|| constants().default_language.clone()));
      let button = match result.year {
        Some(year) => button.attr("data-year", year.to_string()),
        None => button,
      };
      button.child(icon("fa-save")).text(" Import")
    }
  }
}

fn card(result: &SearchResult, now: DateTime<Utc>) -> Node {
  let class = if result.external { "subtitle-card external-subtitle" } else { "subtitle-card" };
  let meta = view::badges(result, now).into_iter().fold(Node::el("div", "subtitle-meta"), |meta, badge| {
    meta.child(Node::el("span", "").child(icon(badge.icon())).text(format!(" {}", badge.text())))
  });
  let actions = view::actions(result)
    .iter()
    .fold(Node::el("div", "subtitle-actions"), |div, action| div.child(action_button(result, *action)));
  let header = Node::el("div", "subtitle-header")
    .child(Node::el("div", "").child(Node::el("div", "subtitle-title").text(result.title.as_str())).child(meta))
    .child(actions);
  Node::el("div", class).child(header)
}

/// Render the results container's inner HTML.
pub fn render_results(view: &ResultsView, now: DateTime<Utc>) -> String {
  let nodes: Vec<Node> = match view {
    ResultsView::Idle => Vec::new(),
    ResultsView::Invalid(msg) | ResultsView::Error(msg) => vec![state_message("fa-exclamation-circle", msg)],
    ResultsView::Loading => {
      vec![Node::el("div", "loading").child(icon("fa-spinner")).child(Node::el("p", "").text(LOADING_TEXT))]
    }
    ResultsView::Empty => vec![state_message("fa-search", NO_RESULTS_TEXT)],
    ResultsView::List { results, .. } => {
      let mut nodes = Vec::with_capacity(results.len() + 1);
      if let Some(banner) = view.banner() {
        nodes.push(Node::el("div", "source-badge").child(icon("fa-globe")).text(format!(" {}", banner)));
      }
      nodes.extend(results.iter().map(|r| card(r, now)));
      nodes
    }
  };
  let mut out = String::new();
  for node in &nodes {
    node.render(&mut out);
  }
  out
}
