//! Server-rendered dashboard: input form, progress view, and the finished report.
//!
//! Every string that came from the user or the model goes through [`html_escape`] before it is
//! interpolated. Styling uses Tailwind utility classes from the CDN build.

use once_cell::sync::Lazy;
use regex::Regex;
use veriscript_core::{
    BlogData, Edition, GenerationState, LlmMode, ScriptInputs, ScriptSlot, Stage,
    VerificationStatus,
};

/// `**bold**` spans on an already-escaped line.
static BOLD: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").ok());

const HEAD: &str = r#"<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<script src="https://cdn.tailwindcss.com"></script>
<link rel="preconnect" href="https://fonts.googleapis.com">
<link href="https://fonts.googleapis.com/css2?family=Merriweather:wght@400;700&family=Noto+Nastaliq+Urdu:wght@400;700&display=swap" rel="stylesheet">
<style>
  .font-serif { font-family: 'Merriweather', Georgia, serif; }
  .font-urdu { font-family: 'Noto Nastaliq Urdu', serif; }
</style>"#;

/// Enables the generate button as soon as script 1 has text (the server re-checks on submit).
const READY_SCRIPT: &str = r#"<script>
  (function () {
    var first = document.getElementById('script1');
    var button = document.getElementById('generate');
    if (!first || !button || button.dataset.credential !== 'yes') return;
    first.addEventListener('input', function () {
      button.disabled = first.value.trim().length === 0;
    });
  })();
</script>"#;

/// Everything the dashboard needs for one render.
pub struct DashboardView<'a> {
    pub app_name: &'a str,
    pub llm_mode: LlmMode,
    pub credential_configured: bool,
    pub inputs: &'a ScriptInputs,
    pub state: &'a GenerationState,
    pub edition: Edition,
    pub notice: Option<&'a str>,
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Markdown-lite: `## ` and `### ` headings, `**bold**`, one paragraph per non-empty line.
pub fn render_article(content: &str, edition: Edition) -> String {
    let urdu = edition == Edition::Urdu;
    let paragraph_class = if urdu {
        "mb-4 text-lg leading-loose text-slate-700"
    } else {
        "mb-4 text-base leading-7 text-slate-700"
    };

    let mut out = String::new();
    for line in content.lines() {
        let trimmed = line.trim_end();
        if trimmed.trim().is_empty() {
            continue;
        }
        if let Some(heading) = trimmed.strip_prefix("### ") {
            out.push_str(&format!(
                r#"<h3 class="text-xl font-bold text-slate-800 mt-6 mb-3">{}</h3>"#,
                render_inline(heading)
            ));
        } else if let Some(heading) = trimmed.strip_prefix("## ") {
            out.push_str(&format!(
                r#"<h2 class="text-2xl font-bold text-slate-900 mt-8 mb-4">{}</h2>"#,
                render_inline(heading)
            ));
        } else {
            out.push_str(&format!(
                r#"<p class="{}">{}</p>"#,
                paragraph_class,
                render_inline(trimmed)
            ));
        }
    }

    let (dir, font) = if urdu { ("rtl", "font-urdu text-right") } else { ("ltr", "font-serif") };
    format!(r#"<div dir="{}" class="max-w-none {}">{}</div>"#, dir, font, out)
}

fn render_inline(text: &str) -> String {
    let escaped = html_escape(text);
    match BOLD.as_ref() {
        Some(re) => re
            .replace_all(&escaped, r#"<strong class="font-bold text-slate-900">$1</strong>"#)
            .into_owned(),
        None => escaped,
    }
}

fn status_badge_class(status: VerificationStatus) -> &'static str {
    match status {
        VerificationStatus::Verified => "bg-emerald-50 text-emerald-700",
        VerificationStatus::PartiallyVerified => "bg-amber-50 text-amber-700",
        VerificationStatus::Unverified => "bg-red-50 text-red-700",
    }
}

fn notice_text(kind: &str) -> &'static str {
    match kind {
        "configuration" => "API key missing. Set VERISCRIPT_API_KEY (or GEMINI_API_KEY) and restart the gateway.",
        "already_generating" => "A report is already being generated.",
        "invalid_transition" => "Start a new project before generating again.",
        "inputs_frozen" => "Scripts cannot be changed while a report is being generated.",
        "empty_script" => "Paste at least the first script before generating.",
        _ => "The request could not be completed.",
    }
}

/// Full dashboard page for the current state.
pub fn dashboard_page(view: &DashboardView<'_>) -> String {
    let state = view.state;
    let mut main = String::new();

    if let Some(kind) = view.notice {
        main.push_str(&format!(
            r#"<div class="p-4 bg-amber-50 text-amber-800 rounded-lg border border-amber-200 text-sm">{}</div>"#,
            html_escape(notice_text(kind))
        ));
    }

    match state.stage {
        Stage::Idle | Stage::Error => main.push_str(&input_view(view)),
        Stage::Complete => match &state.data {
            Some(data) => main.push_str(&results_view(data, view.edition)),
            None => main.push_str(&input_view(view)),
        },
        stage => main.push_str(&loading_view(stage)),
    }

    let refresh = if state.is_generating {
        r#"<meta http-equiv="refresh" content="2">"#
    } else {
        ""
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
{head}
{refresh}
<title>{title}</title>
</head>
<body class="min-h-screen bg-slate-50 text-slate-900">
<nav class="bg-white border-b border-slate-200 sticky top-0 z-50">
  <div class="max-w-7xl mx-auto px-4 sm:px-6 lg:px-8 flex justify-between h-16">
    <div class="flex items-center gap-3">
      <div class="bg-blue-600 px-3 py-2 rounded-lg text-white font-bold">V</div>
      <div>
        <h1 class="text-xl font-bold text-slate-900 tracking-tight">{title}</h1>
        <p class="text-[10px] text-slate-500 font-medium uppercase tracking-wider">AI Investigative Suite</p>
      </div>
    </div>
    <div class="flex items-center gap-2">
      <span class="px-3 py-1 bg-slate-100 rounded-full text-xs font-medium text-slate-600">{mode}</span>
      <span class="px-3 py-1 bg-slate-100 rounded-full text-xs font-medium text-slate-600">v{version}</span>
    </div>
  </div>
</nav>
<main class="max-w-7xl mx-auto px-4 sm:px-6 lg:px-8 py-8 space-y-8">
{main}
</main>
{script}
</body>
</html>"#,
        head = HEAD,
        refresh = refresh,
        title = html_escape(view.app_name),
        mode = view.llm_mode.as_str(),
        version = env!("CARGO_PKG_VERSION"),
        main = main,
        script = READY_SCRIPT,
    )
}

fn input_view(view: &DashboardView<'_>) -> String {
    let state = view.state;
    let mut out = String::from(
        r#"<div class="text-center max-w-2xl mx-auto mb-10">
<h2 class="text-3xl font-bold text-slate-900 mb-4">Turn Raw Transcripts into Verified Journalism</h2>
<p class="text-lg text-slate-600">Input your broadcast scripts. We merge, fact-check against global sources, and write a production-ready news blog.</p>"#,
    );
    if let (Stage::Error, Some(err)) = (state.stage, state.error.as_deref()) {
        out.push_str(&format!(
            r#"<div class="mt-6 p-4 bg-red-50 text-red-700 rounded-lg border border-red-200 text-sm">Error: {}</div>"#,
            html_escape(err)
        ));
    }
    out.push_str("</div>");

    out.push_str(
        r#"<form method="post" action="/generate" class="bg-white rounded-2xl shadow-sm border border-slate-200 overflow-hidden">
<div class="p-6 md:p-8 bg-gradient-to-r from-slate-50 to-white border-b border-slate-100">
<h2 class="text-xl font-bold text-slate-800 mb-2">Source Materials</h2>
<p class="text-slate-500 text-sm">Paste your raw transcripts below. The AI will merge, fact-check, and synthesize them.</p>"#,
    );
    if !view.credential_configured {
        out.push_str(
            r#"<div class="mt-4 p-3 bg-amber-50 border border-amber-200 rounded-lg text-sm text-amber-800">API Key missing. Ensure <code>VERISCRIPT_API_KEY</code> (or <code>GEMINI_API_KEY</code>) is set in your environment.</div>"#,
        );
    }
    out.push_str(r#"</div><div class="grid grid-cols-1 md:grid-cols-3 gap-6 p-6 md:p-8">"#);

    let disabled = if state.is_generating { " disabled" } else { "" };
    for slot in ScriptSlot::ALL {
        let n = slot.number();
        out.push_str(&format!(
            r#"<div class="flex flex-col h-full">
<label for="script{n}" class="text-xs font-semibold uppercase tracking-wider text-slate-400 mb-2">Script {n}</label>
<textarea id="script{n}" name="script{n}" placeholder="Paste transcript #{n} here..." class="flex-1 w-full p-4 rounded-xl bg-slate-50 border border-slate-200 text-sm leading-relaxed resize-none min-h-[250px] outline-none"{disabled}>{text}</textarea>
</div>"#,
            n = n,
            disabled = disabled,
            text = html_escape(view.inputs.get(slot)),
        ));
    }

    let ready = view.credential_configured && view.inputs.is_ready() && !state.is_generating;
    out.push_str(&format!(
        r#"</div>
<div class="p-6 md:p-8 bg-slate-50 border-t border-slate-100 flex justify-end">
<button id="generate" type="submit" data-credential="{credential}" class="px-8 py-4 rounded-xl font-bold text-white shadow-lg bg-blue-600 hover:bg-blue-700 disabled:bg-slate-300 disabled:cursor-not-allowed disabled:shadow-none"{button_disabled}>Generate Investigative Blog</button>
</div>
</form>"#,
        credential = if view.credential_configured { "yes" } else { "no" },
        button_disabled = if ready { "" } else { " disabled" },
    ));
    out
}

fn loading_view(stage: Stage) -> String {
    format!(
        r#"<div class="max-w-xl mx-auto text-center py-20">
<div class="w-16 h-16 mx-auto mb-8 rounded-full border-4 border-blue-100 border-t-blue-600 animate-spin"></div>
<h3 class="text-xl font-bold text-slate-900 mb-2">{headline}</h3>
<p class="text-slate-500 mb-8">This requires complex reasoning. Please wait.</p>
<div class="h-2 bg-slate-100 rounded-full overflow-hidden max-w-sm mx-auto">
<div class="h-full bg-blue-600 transition-all duration-1000 ease-out" style="width: {percent}%"></div>
</div>
<form method="post" action="/reset" class="mt-8"><button type="submit" class="text-sm text-slate-400 hover:text-slate-600 underline">Cancel and start over</button></form>
</div>"#,
        headline = html_escape(stage.headline()),
        percent = stage.progress_percent(),
    )
}

fn results_view(data: &BlogData, edition: Edition) -> String {
    format!(
        r#"<div class="grid grid-cols-1 lg:grid-cols-12 gap-8">
<div class="lg:col-span-8">{article}</div>
<div class="lg:col-span-4 space-y-6">
<div class="bg-blue-600 text-white p-6 rounded-2xl shadow-lg">
<h3 class="font-bold text-lg mb-2">Ready to Publish?</h3>
<p class="text-blue-100 text-sm mb-4">Review the verification report below before publishing. Verified claims are prioritized.</p>
<form method="post" action="/reset"><button type="submit" class="w-full py-2 bg-white text-blue-600 rounded-lg font-bold text-sm hover:bg-blue-50">Start New Project</button></form>
</div>
{analysis}
</div>
</div>"#,
        article = article_panel(data, edition),
        analysis = analysis_panel(data),
    )
}

fn tab(edition: Edition, active: Edition, label: &str, active_color: &str) -> String {
    let class = if edition == active {
        format!("bg-white {} shadow-sm", active_color)
    } else {
        "text-slate-500 hover:text-slate-700".to_string()
    };
    format!(
        r#"<a href="/?edition={}" class="px-4 py-2 rounded-md text-sm font-medium {}">{}</a>"#,
        edition.as_str(),
        class,
        label
    )
}

fn article_panel(data: &BlogData, edition: Edition) -> String {
    let urdu = edition == Edition::Urdu;
    let title = if urdu {
        "تفصیلی تجزیاتی رپورٹ".to_string()
    } else {
        html_escape(&data.seo.title)
    };
    let date = chrono::Local::now().format("%B %-d, %Y");

    let toc = if urdu {
        String::new()
    } else {
        let items: String = data
            .table_of_contents
            .iter()
            .enumerate()
            .map(|(i, item)| {
                format!(
                    r#"<li class="text-sm text-slate-600 flex items-start gap-2"><span class="text-slate-300 font-mono">{:02}</span>{}</li>"#,
                    i + 1,
                    html_escape(item)
                )
            })
            .collect();
        format!(
            r#"<div class="mb-10 p-6 bg-slate-50 rounded-xl border border-slate-100">
<h4 class="font-bold text-slate-800 mb-4 text-sm uppercase tracking-wide">In this Article</h4>
<ul class="space-y-2">{}</ul>
</div>"#,
            items
        )
    };

    format!(
        r#"<div class="bg-white rounded-2xl shadow-sm border border-slate-200 overflow-hidden">
<div class="flex items-center justify-between px-6 py-4 border-b border-slate-100">
<div class="flex bg-slate-100 p-1 rounded-lg">{tab_en}{tab_ur}</div>
<a href="/api/v1/article/{edition}" class="text-sm text-slate-400 hover:text-blue-600" title="Plain markdown for copy/export">Export</a>
</div>
<div class="p-8 md:p-12 bg-white min-h-[600px]">
<div class="mb-10 {align}">
<span class="inline-block px-3 py-1 mb-4 text-xs font-bold tracking-wider text-blue-600 uppercase bg-blue-50 rounded-full">Investigative Report</span>
<h1 class="text-3xl md:text-4xl font-bold text-slate-900 mb-4 {title_font}">{title}</h1>
<div class="flex items-center gap-4 text-sm text-slate-500 {meta_dir}"><span>Verified by VeriScript AI</span><span>&bull;</span><span>{date}</span></div>
</div>
{toc}
{body}
<div class="mt-16 pt-8 border-t border-slate-100 text-center"><p class="text-xs text-slate-400 uppercase tracking-widest">Generated &amp; Fact-Checked by VeriScript AI</p></div>
</div>
</div>"#,
        tab_en = tab(Edition::English, edition, "English Edition", "text-blue-600"),
        tab_ur = tab(Edition::Urdu, edition, "Urdu Version", "text-emerald-600"),
        edition = edition.as_str(),
        align = if urdu { "text-right" } else { "text-left" },
        title_font = if urdu { "font-urdu leading-normal" } else { "font-serif" },
        title = title,
        meta_dir = if urdu { "flex-row-reverse" } else { "" },
        date = date,
        toc = toc,
        body = render_article(data.article(edition), edition),
    )
}

fn card(heading: &str, badge: &str, body: &str) -> String {
    format!(
        r#"<div class="bg-white rounded-xl shadow-sm border border-slate-200 overflow-hidden">
<div class="p-4 border-b border-slate-100 bg-slate-50 flex items-center justify-between"><h3 class="font-bold text-slate-800">{}</h3>{}</div>
<div class="p-4 space-y-4">{}</div>
</div>"#,
        heading, badge, body
    )
}

fn analysis_panel(data: &BlogData) -> String {
    let summary = data.verification_summary();
    let claims: String = data
        .verification_report
        .iter()
        .map(|item| {
            format!(
                r#"<div class="text-sm"><p class="text-slate-800 font-medium mb-1">{}</p><div class="flex items-center gap-2"><span class="text-[10px] uppercase font-bold tracking-wider px-1.5 py-0.5 rounded {}">{}</span><span class="text-xs text-slate-500 italic">{}</span></div></div>"#,
                html_escape(&item.claim),
                status_badge_class(item.status),
                item.status,
                html_escape(&item.source_note)
            )
        })
        .collect();
    let counts = format!(
        r#"<p class="text-xs text-slate-500">{} verified &middot; {} partially verified &middot; {} unverified</p>"#,
        summary.verified, summary.partially_verified, summary.unverified
    );
    let claims_badge = format!(
        r#"<span class="text-xs font-medium px-2 py-1 bg-white border border-slate-200 rounded-full text-slate-600">{} Claims Checked</span>"#,
        summary.total()
    );

    let seo = format!(
        r#"<div><label class="text-xs font-semibold text-slate-400 uppercase">Optimized Title</label><p class="text-sm font-medium text-slate-800 mt-1">{}</p></div>
<div><label class="text-xs font-semibold text-slate-400 uppercase">Meta Description</label><p class="text-sm text-slate-600 mt-1 leading-relaxed">{}</p></div>"#,
        html_escape(&data.seo.title),
        html_escape(&data.seo.meta_description)
    );

    let images: String = data
        .image_prompts
        .iter()
        .map(|img| {
            let context = img
                .context
                .as_deref()
                .map(|c| format!(r#"<span class="text-xs text-slate-400">{}</span>"#, html_escape(c)))
                .unwrap_or_default();
            format!(
                r#"<div class="bg-slate-50 p-3 rounded-lg border border-slate-100"><div class="flex items-center justify-between mb-2"><span class="text-xs font-bold text-purple-700 bg-purple-50 px-2 py-0.5 rounded-md border border-purple-100">{}</span>{}</div><p class="text-xs text-slate-600 font-mono leading-relaxed select-all">{}</p></div>"#,
                img.kind.as_str().to_uppercase(),
                context,
                html_escape(&img.prompt)
            )
        })
        .collect();

    let links: String = data
        .internal_links
        .iter()
        .map(|link| {
            format!(
                r#"<div class="text-sm"><span class="text-blue-600 font-medium">{}</span><p class="text-xs text-slate-500 mt-0.5">Insert at: {}</p></div>"#,
                html_escape(&link.anchor_text),
                html_escape(&link.placement_context)
            )
        })
        .collect();

    [
        card("Verification Report", &claims_badge, &format!("{}{}", counts, claims)),
        card("SEO Strategy", "", &seo),
        card("AI Image Assets", "", &images),
        card("Internal Linking", "", &links),
    ]
    .concat()
}

#[cfg(test)]
mod tests {
    use super::*;
    use veriscript_core::SAMPLE_DOCUMENT;

    fn sample() -> BlogData {
        BlogData::from_json(SAMPLE_DOCUMENT).unwrap()
    }

    fn view<'a>(state: &'a GenerationState, inputs: &'a ScriptInputs, credential: bool) -> DashboardView<'a> {
        DashboardView {
            app_name: "VeriScript AI",
            llm_mode: LlmMode::Mock,
            credential_configured: credential,
            inputs,
            state,
            edition: Edition::English,
            notice: None,
        }
    }

    #[test]
    fn article_renders_headings_and_bold() {
        let html = render_article("## Top\n\n### Sub\nA **strong** claim", Edition::English);
        assert!(html.contains(">Top</h2>"));
        assert!(html.contains(">Sub</h3>"));
        assert!(html.contains(r#"<strong class="font-bold text-slate-900">strong</strong>"#));
        assert!(html.contains(r#"dir="ltr""#));
    }

    #[test]
    fn article_escapes_markup_and_urdu_is_rtl() {
        let html = render_article("<script>x</script> **b**", Edition::Urdu);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains(r#"dir="rtl""#));
    }

    #[test]
    fn idle_without_credential_disables_generate_and_warns() {
        let state = GenerationState::idle();
        let inputs = ScriptInputs::new("A", "", "");
        let html = dashboard_page(&view(&state, &inputs, false));
        assert!(html.contains("API Key missing"));
        assert!(html.contains(r#"data-credential="no""#));
        assert!(html.contains("Generate Investigative Blog</button>") && html.contains(" disabled>Generate"));
    }

    #[test]
    fn idle_with_credential_and_script_enables_generate() {
        let state = GenerationState::idle();
        let inputs = ScriptInputs::new("A", "", "");
        let html = dashboard_page(&view(&state, &inputs, true));
        assert!(!html.contains(" disabled>Generate"));
        assert!(!html.contains("http-equiv=\"refresh\""));
    }

    #[test]
    fn loading_view_refreshes_and_shows_stage() {
        let state = GenerationState::in_flight(Stage::Writing);
        let inputs = ScriptInputs::default();
        let html = dashboard_page(&view(&state, &inputs, true));
        assert!(html.contains("Drafting Investigative Report..."));
        assert!(html.contains("width: 75%"));
        assert!(html.contains("http-equiv=\"refresh\""));
    }

    #[test]
    fn error_state_shows_message_above_inputs() {
        let state = GenerationState::failed("network unreachable");
        let inputs = ScriptInputs::new("kept", "", "");
        let html = dashboard_page(&view(&state, &inputs, true));
        assert!(html.contains("Error: network unreachable"));
        assert!(html.contains(">kept</textarea>"));
    }

    #[test]
    fn results_show_report_and_switch_editions() {
        let state = GenerationState::complete(sample());
        let inputs = ScriptInputs::default();
        let mut v = view(&state, &inputs, true);
        let english = dashboard_page(&v);
        assert!(english.contains("3 Claims Checked"));
        assert!(english.contains("In this Article"));
        assert!(english.contains("Partially Verified"));
        assert!(english.contains("Start New Project"));

        v.edition = Edition::Urdu;
        let urdu = dashboard_page(&v);
        assert!(!urdu.contains("In this Article"));
        assert!(urdu.contains(r#"dir="rtl""#));
        assert!(urdu.contains("/api/v1/article/urdu"));
    }

    #[test]
    fn notices_are_rendered() {
        let state = GenerationState::idle();
        let inputs = ScriptInputs::default();
        let mut v = view(&state, &inputs, false);
        v.notice = Some("configuration");
        assert!(dashboard_page(&v).contains("API key missing. Set VERISCRIPT_API_KEY"));
    }
}
