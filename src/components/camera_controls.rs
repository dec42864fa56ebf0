use crate::state::viewport::PanDirection;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct CameraControlsProps {
    pub zoom_percent: i64,
    pub scale_meters: i64,
    pub on_zoom_in: Callback<()>,
    pub on_zoom_out: Callback<()>,
    pub on_reset: Callback<()>,
    pub on_pan: Callback<PanDirection>,
}

const EDGE_BTN: &str = "position:absolute; z-index:20; width:40px; height:40px; border-radius:50%; border:1px solid #4b5563; background:rgba(17,24,39,0.85); color:#e5e7eb; cursor:pointer; font-size:16px;";

#[function_component(CameraControls)]
pub fn camera_controls(props: &CameraControlsProps) -> Html {
    let zi = {
        let cb = props.on_zoom_in.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let zo = {
        let cb = props.on_zoom_out.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let rs = {
        let cb = props.on_reset.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let pan = |dir: PanDirection| {
        let cb = props.on_pan.clone();
        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            cb.emit(dir)
        })
    };
    html! {<>
        <button style={format!("{EDGE_BTN} left:12px; top:50%; transform:translateY(-50%);")} onclick={pan(PanDirection::Left)}>{"←"}</button>
        <button style={format!("{EDGE_BTN} right:12px; top:50%; transform:translateY(-50%);")} onclick={pan(PanDirection::Right)}>{"→"}</button>
        <button style={format!("{EDGE_BTN} top:12px; left:50%; transform:translateX(-50%);")} onclick={pan(PanDirection::Up)}>{"↑"}</button>
        <button style={format!("{EDGE_BTN} bottom:12px; left:50%; transform:translateX(-50%);")} onclick={pan(PanDirection::Down)}>{"↓"}</button>
        <div style="position:absolute; left:12px; bottom:12px; z-index:20; background:rgba(17,24,39,0.9); border:1px solid #4b5563; border-radius:6px; padding:6px 10px; color:#e5e7eb; font-size:12px; display:flex; flex-direction:column; gap:4px;">
            <div style="width:100px; height:4px; background:#e5e7eb;"></div>
            <span>{format!("{} м", props.scale_meters)}</span>
        </div>
        <div style="position:absolute; right:12px; bottom:12px; z-index:20; background:rgba(17,24,39,0.9); border:1px solid #4b5563; border-radius:8px; padding:8px; display:flex; flex-direction:column; gap:6px; align-items:center; color:#e5e7eb;">
            <button onclick={zi} title="Приблизить"> {"+"} </button>
            <button onclick={rs} title="Сбросить вид" style="font-size:12px; min-width:48px;">{format!("{}%", props.zoom_percent)}</button>
            <button onclick={zo} title="Отдалить"> {"-"} </button>
        </div>
    </>}
}
