// The trusted bridge script injected into preview HTML. It runs inside the
// sandbox iframe and relays element selection to the editor, applying edits
// sent back. It posts plain data only; see `bridge` for the message types.
//
// The editor strips the `ai-preview-*` nodes and selection markers back out
// before reading code from the iframe, so everything injected here carries
// a recognizable id, class, or data attribute.

/// Marker id. Present in the script markup itself, so its presence in a
/// document means the bridge is already installed.
pub const BRIDGE_SCRIPT_ID: &str = "ai-preview-script";

pub const BRIDGE_SCRIPT: &str = r#"<style id="ai-preview-style">
  .ai-selected-element { outline: 2px solid #8b5cf6 !important; outline-offset: 2px; }
</style>
<script id="ai-preview-script">
(function () {
  var selected = null;

  function dropMarkers() {
    if (!selected) return;
    selected.classList.remove('ai-selected-element');
    selected.removeAttribute('data-ai-selected');
  }

  function clearSelection() {
    dropMarkers();
    selected = null;
    window.parent.postMessage({ type: 'CLEAR_SELECTION' }, '*');
  }

  document.addEventListener('click', function (event) {
    var el = event.target;
    if (!el || el === document.body || el === document.documentElement) {
      clearSelection();
      return;
    }
    event.preventDefault();
    event.stopPropagation();

    dropMarkers();
    selected = el;
    el.classList.add('ai-selected-element');
    el.setAttribute('data-ai-selected', 'true');

    var computed = window.getComputedStyle(el);
    window.parent.postMessage({
      type: 'ELEMENT_SELECTED',
      payload: {
        tagName: el.tagName.toLowerCase(),
        className: el.getAttribute('class') || '',
        text: el.textContent || '',
        styles: {
          padding: computed.padding,
          margin: computed.margin,
          backgroundColor: computed.backgroundColor,
          color: computed.color,
          fontSize: computed.fontSize
        }
      }
    }, '*');
  }, true);

  window.addEventListener('message', function (event) {
    var data = event.data || {};
    if (data.type === 'UPDATE_ELEMENT' && selected) {
      var updates = data.payload || {};
      if (typeof updates.text === 'string') {
        selected.textContent = updates.text;
      }
      if (typeof updates.className === 'string') {
        selected.setAttribute('class', updates.className);
        selected.classList.add('ai-selected-element');
      }
      var styles = updates.styles || {};
      for (var key in styles) {
        if (typeof styles[key] === 'string') {
          selected.style[key] = styles[key];
        }
      }
    } else if (data.type === 'CLEAR_SELECTION_REQUEST') {
      clearSelection();
    }
  });
})();
</script>
"#;

/// Installs the bridge into a document, immediately before `</body>` when
/// one exists. Re-injection is a no-op (marker id guard).
pub fn inject_bridge_script(html: &str) -> String {
    if html.contains(BRIDGE_SCRIPT_ID) {
        return html.to_string();
    }
    match html.find("</body>") {
        Some(idx) => format!("{}{}{}", &html[..idx], BRIDGE_SCRIPT, &html[idx..]),
        None => format!("{html}{BRIDGE_SCRIPT}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_injects_before_closing_body() {
        let html = "<html><body><h1>Hi</h1></body></html>";
        let output = inject_bridge_script(html);
        let script_pos = output.find(BRIDGE_SCRIPT_ID).unwrap();
        let body_close = output.find("</body>").unwrap();
        assert!(script_pos < body_close);
        assert!(output.ends_with("</body></html>"));
    }

    #[test]
    fn test_appends_when_no_body_tag() {
        let html = "<h1>Fragment</h1>";
        let output = inject_bridge_script(html);
        assert!(output.starts_with("<h1>Fragment</h1>"));
        assert!(output.contains(BRIDGE_SCRIPT_ID));
    }

    #[test]
    fn test_injection_is_idempotent() {
        let html = "<html><body>x</body></html>";
        let once = inject_bridge_script(html);
        let twice = inject_bridge_script(&once);
        assert_eq!(once, twice);
        assert_eq!(twice.matches(BRIDGE_SCRIPT_ID).count(), 1);
    }

    #[test]
    fn test_script_posts_plain_data_only() {
        // The script must never post the element itself; it reads the class
        // attribute as a string (SVG elements have a non-string className).
        assert!(BRIDGE_SCRIPT.contains("el.getAttribute('class')"));
        assert!(!BRIDGE_SCRIPT.contains("postMessage(el"));
    }
}
