use crate::model::MarkerKind;
use crate::state::annotation::{ERASER_WIDTH_RANGE, PEN_WIDTH_RANGE, ToolKind};
use web_sys::HtmlInputElement;
use yew::prelude::*;

const PEN_COLORS: [&str; 6] = ["#ff0000", "#000000", "#2563eb", "#16a34a", "#facc15", "#ffffff"];

#[derive(Properties, PartialEq, Clone)]
pub struct MapToolbarProps {
    pub active: Option<ToolKind>,
    pub pen_color: String,
    pub pen_width: f64,
    pub eraser_width: f64,
    pub on_tool: Callback<ToolKind>,
    pub on_pen_color: Callback<String>,
    pub on_pen_width: Callback<f64>,
    pub on_eraser_width: Callback<f64>,
    pub on_close: Callback<()>,
}

fn range_input(value: f64, range: (f64, f64), cb: Callback<f64>) -> Html {
    let oninput = Callback::from(move |e: InputEvent| {
        let input: HtmlInputElement = e.target_unchecked_into();
        if let Ok(v) = input.value().parse::<f64>() {
            cb.emit(v);
        }
    });
    html! {
        <input type="range" min={range.0.to_string()} max={range.1.to_string()} step="1"
            value={value.to_string()} {oninput} style="width:90px;" />
    }
}

#[function_component(MapToolbar)]
pub fn map_toolbar(props: &MapToolbarProps) -> Html {
    let tool_btn = |kind: ToolKind, glyph: &'static str, title: &'static str, tint: &'static str| {
        let cb = props.on_tool.clone();
        let active = props.active == Some(kind);
        let border = if active { "2px solid #facc15" } else { "1px solid #4b5563" };
        let style = format!(
            "width:36px; height:36px; border-radius:6px; border:{border}; background:{tint}; color:#fff; cursor:pointer; font-size:16px;"
        );
        html! {
            <button {style} {title} onclick={Callback::from(move |_| cb.emit(kind))}>{glyph}</button>
        }
    };
    let markers = MarkerKind::ALL
        .iter()
        .map(|&k| tool_btn(ToolKind::Marker(k), k.glyph(), k.label(), k.colors().0))
        .collect::<Html>();

    let pen_settings = if props.active == Some(ToolKind::Pen) {
        let swatches = PEN_COLORS
            .iter()
            .map(|&c| {
                let cb = props.on_pen_color.clone();
                let border = if props.pen_color == c { "2px solid #facc15" } else { "1px solid #4b5563" };
                html! {
                    <button style={format!("width:20px; height:20px; border-radius:50%; border:{border}; background:{c}; cursor:pointer;")}
                        onclick={Callback::from(move |_| cb.emit(c.to_string()))}></button>
                }
            })
            .collect::<Html>();
        html! {
            <div style="display:flex; gap:6px; align-items:center;">
                {swatches}
                {range_input(props.pen_width, PEN_WIDTH_RANGE, props.on_pen_width.clone())}
                <span style="font-size:12px;">{format!("{}px", props.pen_width)}</span>
            </div>
        }
    } else if props.active == Some(ToolKind::Eraser) {
        html! {
            <div style="display:flex; gap:6px; align-items:center;">
                {range_input(props.eraser_width, ERASER_WIDTH_RANGE, props.on_eraser_width.clone())}
                <span style="font-size:12px;">{format!("{}px", props.eraser_width)}</span>
            </div>
        }
    } else {
        html! {}
    };

    let close = {
        let cb = props.on_close.clone();
        Callback::from(move |_| cb.emit(()))
    };

    html! {
        <div style="display:flex; flex-wrap:wrap; gap:6px; align-items:center; padding:8px 12px; background:#1c1917; border-bottom:1px solid #44403c; color:#e7e5e4;">
            {markers}
            <span style="width:12px;"></span>
            {tool_btn(ToolKind::Pen, "✎", "Карандаш", "#374151")}
            {tool_btn(ToolKind::Eraser, "⌫", "Ластик", "#374151")}
            {pen_settings}
            <span style="flex:1;"></span>
            <button onclick={close} title="Закрыть">{"✕"}</button>
        </div>
    }
}
