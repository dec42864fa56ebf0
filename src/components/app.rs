use super::{
    add_document_modal::AddDocumentModal, document_folder::DocumentFolder,
    fullscreen_viewer::FullscreenViewer, map_modal::MapModal, welcome_guide::WelcomeGuide,
};
use crate::model::{DocumentAction, Documents};
use crate::storage::{self, DOCUMENTS_KEY, GUIDE_SEEN_KEY};
use crate::util::{clog, next_id};
use yew::prelude::*;

/// Viewer index after removing `removed`, or `None` once the list is empty.
fn clamp_after_delete(current: Option<usize>, removed: usize, new_len: usize) -> Option<usize> {
    let cur = current?;
    if new_len == 0 {
        return None;
    }
    let shifted = if removed < cur { cur - 1 } else { cur };
    Some(shifted.min(new_len - 1))
}

#[function_component(App)]
pub fn app() -> Html {
    let documents = use_reducer(Documents::default);
    let hydrated = use_mut_ref(|| false);
    let map_open = use_state(|| false);
    let folder_open = use_state(|| false);
    let add_open = use_state(|| false);
    let fullscreen = use_state(|| None::<usize>);
    let show_guide = use_state(|| false);

    // Load persisted documents and the first-run flag
    {
        let documents = documents.clone();
        let show_guide = show_guide.clone();
        use_effect_with((), move |_| {
            documents.dispatch(DocumentAction::Load(storage::load_list(DOCUMENTS_KEY)));
            if !storage::load_flag(GUIDE_SEEN_KEY) {
                show_guide.set(true);
            }
            || ()
        });
    }
    // Persist document list changes (skip the pre-load empty state)
    {
        let hydrated = hydrated.clone();
        use_effect_with(documents.items.clone(), move |items| {
            if *hydrated.borrow() {
                storage::save(DOCUMENTS_KEY, items);
            } else {
                *hydrated.borrow_mut() = true;
            }
            || ()
        });
    }

    let any_modal_open = *map_open || *folder_open || *add_open;

    let open_map = {
        let map_open = map_open.clone();
        Callback::from(move |_: MouseEvent| {
            if !any_modal_open {
                map_open.set(true);
            }
        })
    };
    let close_map = {
        let map_open = map_open.clone();
        Callback::from(move |()| map_open.set(false))
    };
    let open_add = {
        let add_open = add_open.clone();
        Callback::from(move |_: MouseEvent| {
            if !any_modal_open {
                add_open.set(true);
            }
        })
    };
    let close_add = {
        let add_open = add_open.clone();
        Callback::from(move |()| add_open.set(false))
    };
    let add_document = {
        let documents = documents.clone();
        Callback::from(move |url: String| {
            let id = next_id("doc");
            clog(&format!("desk: added document {id}"));
            documents.dispatch(DocumentAction::Add { id, url });
        })
    };
    let delete_document = {
        let documents = documents.clone();
        let fullscreen = fullscreen.clone();
        Callback::from(move |index: usize| {
            let len = documents.items.len();
            if index >= len {
                return;
            }
            documents.dispatch(DocumentAction::Remove { index });
            fullscreen.set(clamp_after_delete(*fullscreen, index, len - 1));
        })
    };
    let on_folder_open = {
        let folder_open = folder_open.clone();
        Callback::from(move |open: bool| folder_open.set(open))
    };
    let open_fullscreen = {
        let fullscreen = fullscreen.clone();
        Callback::from(move |index: usize| fullscreen.set(Some(index)))
    };
    let on_focus_change = {
        let fullscreen = fullscreen.clone();
        Callback::from(move |index: usize| {
            if fullscreen.is_some() {
                fullscreen.set(Some(index));
            }
        })
    };
    let close_fullscreen = {
        let fullscreen = fullscreen.clone();
        Callback::from(move |()| fullscreen.set(None))
    };
    let navigate_fullscreen = {
        let fullscreen = fullscreen.clone();
        Callback::from(move |index: usize| fullscreen.set(Some(index)))
    };
    let close_guide = {
        let show_guide = show_guide.clone();
        Callback::from(move |()| {
            storage::save_flag(GUIDE_SEEN_KEY, true);
            show_guide.set(false);
        })
    };

    let dim = if any_modal_open { "pointer-events:none; opacity:0.5;" } else { "pointer-events:auto; opacity:1;" };

    html! {
        <div class="desk" style="position:fixed; inset:0; overflow:hidden; background:#2b2118 url(assets/desk.jpg) center/cover no-repeat;">
            <div onclick={open_map} title="Карта"
                style={format!("position:absolute; left:2vw; top:4vh; width:26vw; height:34vh; cursor:pointer; background:url(assets/map.bmp) center/cover; transform:rotate(-4deg); box-shadow:0 10px 30px rgba(0,0,0,0.6); transition:opacity 0.3s; {dim}")}>
            </div>
            <DocumentFolder
                documents={documents.items.clone()}
                locked={*map_open || *add_open}
                focus_request={*fullscreen}
                on_delete={delete_document.clone()}
                on_open_fullscreen={open_fullscreen}
                on_open_change={on_folder_open}
                {on_focus_change}
            />
            <button onclick={open_add} title="Добавить документ"
                style={format!("position:absolute; left:calc(34vw + 460px); top:calc(50vh - 280px); width:48px; height:48px; border-radius:50%; border:2px solid #57534e; background:#292524; color:#e7e5e4; font-size:24px; cursor:pointer; z-index:1150; {dim}")}>
                {"+"}
            </button>
            <MapModal show={*map_open} on_close={close_map} />
            <AddDocumentModal show={*add_open} on_close={close_add} on_add={add_document} />
            if let Some(index) = *fullscreen {
                <FullscreenViewer
                    documents={documents.items.clone()}
                    {index}
                    on_close={close_fullscreen}
                    on_navigate={navigate_fullscreen}
                    on_delete={delete_document}
                />
            }
            <WelcomeGuide show={*show_guide} on_close={close_guide} />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::clamp_after_delete;

    #[test]
    fn deleting_last_page_closes_viewer() {
        assert_eq!(clamp_after_delete(Some(0), 0, 0), None);
    }

    #[test]
    fn deleting_shown_tail_page_steps_back() {
        assert_eq!(clamp_after_delete(Some(2), 2, 2), Some(1));
    }

    #[test]
    fn deleting_earlier_page_keeps_same_document_shown() {
        assert_eq!(clamp_after_delete(Some(3), 1, 4), Some(2));
    }

    #[test]
    fn closed_viewer_stays_closed() {
        assert_eq!(clamp_after_delete(None, 0, 3), None);
    }
}
