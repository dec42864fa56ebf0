use crate::model::Document;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct FullscreenViewerProps {
    pub documents: Vec<Document>,
    pub index: usize,
    pub on_close: Callback<()>,
    pub on_navigate: Callback<usize>,
    pub on_delete: Callback<usize>,
}

#[function_component(FullscreenViewer)]
pub fn fullscreen_viewer(props: &FullscreenViewerProps) -> Html {
    let Some(doc) = props.documents.get(props.index) else {
        return html! {};
    };
    let len = props.documents.len();
    let index = props.index;

    let close = {
        let cb = props.on_close.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let prev = {
        let cb = props.on_navigate.clone();
        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            if index > 0 {
                cb.emit(index - 1);
            }
        })
    };
    let next = {
        let cb = props.on_navigate.clone();
        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            if index + 1 < len {
                cb.emit(index + 1);
            }
        })
    };
    let delete = {
        let cb = props.on_delete.clone();
        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            cb.emit(index);
        })
    };
    let stop = Callback::from(|e: MouseEvent| e.stop_propagation());

    html! {
        <div onclick={close.clone()} style="position:fixed; inset:0; z-index:100000; background:rgba(0,0,0,0.9); display:flex; align-items:center; justify-content:center;">
            <img src={doc.url.clone()} alt="" onclick={stop}
                style="max-width:90vw; max-height:90vh; object-fit:contain; box-shadow:0 10px 40px rgba(0,0,0,0.8);" />
            <div style="position:absolute; top:16px; right:16px; display:flex; gap:8px;">
                <button onclick={delete} title="Удалить">{"🗑"}</button>
                <button onclick={close} title="Закрыть">{"✕"}</button>
            </div>
            if index > 0 {
                <button onclick={prev} style="position:absolute; left:16px; top:50%; transform:translateY(-50%); font-size:24px;">{"‹"}</button>
            }
            if index + 1 < len {
                <button onclick={next} style="position:absolute; right:16px; top:50%; transform:translateY(-50%); font-size:24px;">{"›"}</button>
            }
            <div style="position:absolute; bottom:16px; left:50%; transform:translateX(-50%); color:#e7e5e4; font-size:14px;">
                {format!("{} / {}", index + 1, len)}
            </div>
        </div>
    }
}
