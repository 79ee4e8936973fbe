use crate::{
    models::{CoffeeSize, PaymentForm, PaymentRecord, Session},
    services::CoffeeApp,
};
use ethers::types::Address;
use std::fmt::Write;

/// Snapshot of application state rendered into the page.
#[derive(Debug, Clone)]
pub struct PageView {
    pub session: Session,
    pub form: PaymentForm,
    pub pending: bool,
    pub payments: Vec<PaymentRecord>,
    pub contract_address: Address,
}

impl PageView {
    pub async fn capture(app: &CoffeeApp) -> Self {
        Self {
            session: app.session().await,
            form: app.form().await,
            pending: app.is_pending(),
            payments: app.payments().await,
            contract_address: app.contract_address(),
        }
    }

    pub fn send_disabled(&self) -> bool {
        self.pending || !self.session.can_transact()
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// 0x1234…abcd
pub fn short_address(address: &Address) -> String {
    let full = format!("{:?}", address);
    format!("{}…{}", &full[..6], &full[full.len() - 4..])
}

pub fn render_payment(record: &PaymentRecord) -> String {
    let sent_at = record
        .sent_at()
        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| record.timestamp.to_string());

    format!(
        r#"<li class="payment"><p class="memo"><strong>{name}</strong>: {message}</p><p class="meta">{from} · {sent_at}</p></li>"#,
        name = escape_html(&record.name),
        message = escape_html(&record.message),
        from = short_address(&record.from),
        sent_at = sent_at,
    )
}

fn render_header(view: &PageView) -> String {
    let action = match (&view.session.account, view.session.wallet_available) {
        (Some(account), _) if view.session.logged_in => format!(
            r#"<span class="account">{}</span><form method="post" action="/disconnect"><button type="submit">Disconnect</button></form>"#,
            short_address(account)
        ),
        (_, true) => r#"<form method="post" action="/connect"><button type="submit">Connect Wallet</button></form>"#
            .to_string(),
        (_, false) => r#"<button type="button" disabled title="No wallet available">Connect Wallet</button>"#
            .to_string(),
    };

    format!(r#"<header><h1>Buy me a coffee!</h1><div class="wallet">{}</div></header>"#, action)
}

fn render_form(view: &PageView) -> String {
    let disabled = if view.send_disabled() { " disabled" } else { "" };

    let mut buttons = String::new();
    for size in CoffeeSize::ALL {
        let _ = write!(
            buttons,
            r#"<button class="send" type="submit" name="size" value="{value}"{disabled}>{label} ({amount} ETH)</button>"#,
            value = size.value(),
            label = size.label(),
            amount = size.amount_eth(),
            disabled = disabled,
        );
    }

    let pending = if view.pending {
        r#"<p id="pending">Waiting for confirmation…</p>"#
    } else {
        r#"<p id="pending" hidden>Waiting for confirmation…</p>"#
    };

    format!(
        r#"<form id="coffee" method="post" action="/coffee">
<label>Name <input name="name" value="{name}" placeholder="Anonymous"></label>
<label>Message <input name="message" value="{message}" placeholder="Enjoy your coffee!"></label>
<div class="buttons">{buttons}</div>
{pending}
</form>"#,
        name = escape_html(&view.form.name),
        message = escape_html(&view.form.message),
        buttons = buttons,
        pending = pending,
    )
}

fn render_payments(view: &PageView) -> String {
    let items: String = view.payments.iter().map(render_payment).collect();
    format!(
        r#"<section class="received"><h2>Coffees received</h2><ul id="payments">{}</ul></section>"#,
        items
    )
}

const STYLE: &str = r#"
body { margin: 0; min-height: 100vh; font-family: monospace; color: #eee; background: linear-gradient(to right, #3730a3, #000); }
header { display: flex; justify-content: space-between; align-items: center; height: 5rem; padding: 0 2.5rem; border-bottom: 2px solid #000; }
.wallet { display: flex; gap: 1rem; align-items: center; }
main { display: flex; gap: 2rem; padding: 2rem 2.5rem; }
form#coffee { display: flex; flex-direction: column; gap: 1rem; min-width: 20rem; }
input { display: block; width: 100%; padding: .5rem; }
.received { flex: 1; max-height: 70vh; overflow-y: auto; }
.payment { list-style: none; border: 1px solid #555; padding: .5rem 1rem; margin-bottom: .5rem; }
.meta { color: #aaa; font-size: .8rem; }
button[disabled] { opacity: .5; cursor: not-allowed; }
"#;

const SCRIPT: &str = r#"
(function () {
  var scheme = location.protocol === "https:" ? "wss://" : "ws://";
  var socket = new WebSocket(scheme + location.host + "/ws/payments");
  var list = document.getElementById("payments");
  var pending = document.getElementById("pending");
  function text(tag, cls, value) {
    var el = document.createElement(tag);
    if (cls) el.className = cls;
    el.textContent = value;
    return el;
  }
  socket.onmessage = function (msg) {
    var event = JSON.parse(msg.data);
    if (event.type === "payment") {
      var item = document.createElement("li");
      item.className = "payment";
      var memo = text("p", "memo", ": " + event.message);
      memo.prepend(text("strong", null, event.name));
      item.appendChild(memo);
      item.appendChild(text("p", "meta", event.from + " · " + new Date(event.timestamp * 1000).toISOString()));
      list.appendChild(item);
    } else if (event.type === "pending") {
      pending.hidden = !event.pending;
      if (!event.pending) location.reload();
    } else if (event.type === "session") {
      location.reload();
    }
  };
})();
"#;

/// Renders the whole page. Pure: the same view always yields the same markup.
pub fn render_page(view: &PageView) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Buy me a coffee!</title>
<style>{style}</style>
</head>
<body data-contract="{contract:?}">
{header}
<main>
{form}
{payments}
</main>
<script>{script}</script>
</body>
</html>"#,
        style = STYLE,
        contract = view.contract_address,
        header = render_header(view),
        form = render_form(view),
        payments = render_payments(view),
        script = SCRIPT,
    )
}
