pub mod figures;
pub mod html;
pub mod json;
pub mod metrics_txt;
pub mod summary_txt;
pub mod svg;
pub mod zip;

/// Dashboard panels the user can switch on and off.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum View {
    Table,
    Composition,
    Lengths,
    Categories,
    Histogram,
}

impl View {
    pub const ALL: [View; 5] = [
        View::Table,
        View::Composition,
        View::Lengths,
        View::Categories,
        View::Histogram,
    ];
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn fmt_int(v: u64) -> String {
    let s = v.to_string();
    let mut out = String::with_capacity(s.len() + s.len() / 3);
    let len = s.len();
    for (i, ch) in s.chars().enumerate() {
        if i != 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn fmt_num(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 && v.abs() < 1e15 {
        format!("{}", v.round() as i64)
    } else {
        format!("{:.4}", v)
    }
}
