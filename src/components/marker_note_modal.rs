use crate::model::Marker;
use web_sys::HtmlTextAreaElement;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct MarkerNoteModalProps {
    pub marker: Marker,
    pub on_save: Callback<String>,
    pub on_delete: Callback<()>,
    pub on_close: Callback<()>,
}

#[function_component(MarkerNoteModal)]
pub fn marker_note_modal(props: &MarkerNoteModalProps) -> Html {
    let draft = {
        let note = props.marker.note.clone();
        use_state(move || note)
    };
    // reseed when a different marker is opened
    {
        let draft = draft.clone();
        use_effect_with(props.marker.id.clone(), {
            let note = props.marker.note.clone();
            move |_| {
                draft.set(note);
                || ()
            }
        });
    }

    let on_input = {
        let draft = draft.clone();
        Callback::from(move |e: InputEvent| {
            let area: HtmlTextAreaElement = e.target_unchecked_into();
            draft.set(area.value());
        })
    };
    let save = {
        let draft = draft.clone();
        let cb = props.on_save.clone();
        Callback::from(move |_| cb.emit((*draft).clone()))
    };
    let delete = {
        let cb = props.on_delete.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let close = {
        let cb = props.on_close.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let stop = Callback::from(|e: MouseEvent| e.stop_propagation());
    let kind = props.marker.kind;

    html! {
        <div onmousedown={stop.clone()} onclick={stop}
            style="position:absolute; inset:0; z-index:50; background:rgba(0,0,0,0.6); display:flex; align-items:center; justify-content:center;">
            <div style="background:#1c1917; border:2px solid #57534e; border-radius:10px; padding:16px; width:min(360px, 90%); color:#e7e5e4; display:flex; flex-direction:column; gap:10px;">
                <div style="display:flex; align-items:center; gap:8px;">
                    <span style="font-size:20px;">{kind.glyph()}</span>
                    <strong>{kind.label()}</strong>
                </div>
                <textarea rows="5" placeholder="Заметка..." value={(*draft).clone()} oninput={on_input}
                    style="resize:vertical; padding:8px; background:#292524; border:1px solid #57534e; border-radius:6px; color:#e7e5e4;"></textarea>
                <div style="display:flex; gap:8px; justify-content:space-between;">
                    <button onclick={delete} style="color:#ef4444;">{"Удалить метку"}</button>
                    <div style="display:flex; gap:8px;">
                        <button onclick={close}>{"Отмена"}</button>
                        <button onclick={save}>{"Сохранить"}</button>
                    </div>
                </div>
            </div>
        </div>
    }
}
