use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions};
use gloo::timers::callback::Timeout;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, KeyboardEvent, MouseEvent, TouchEvent};
use yew::prelude::*;

use crate::model::{Document, ScreenPoint, ScreenRect};
use crate::state::StackController;
use crate::state::stack::{
    DROP_ZONE_WIDTH_PX, FLIP_DURATION_MS, HOLD_DELAY_MS, Navigation, Release, drop_zone_strip,
};
use crate::util::{clog, window_size};

#[derive(Properties, PartialEq, Clone)]
pub struct DocumentFolderProps {
    pub documents: Vec<Document>,
    /// Another surface is open; the cover ignores clicks while closed.
    pub locked: bool,
    /// Page the fullscreen viewer is showing, mirrored into stack focus.
    pub focus_request: Option<usize>,
    pub on_delete: Callback<usize>,
    pub on_open_fullscreen: Callback<usize>,
    pub on_open_change: Callback<bool>,
    pub on_focus_change: Callback<usize>,
}

// Pending timers; dropping a Timeout cancels it.
#[derive(Default)]
struct Timers {
    hold: Option<Timeout>,
    flip: Option<Timeout>,
}

fn pointer_of(e: &MouseEvent) -> ScreenPoint {
    ScreenPoint::new(e.client_x() as f64, e.client_y() as f64)
}

fn touch_point(list: web_sys::TouchList) -> Option<ScreenPoint> {
    let t = list.item(0)?;
    Some(ScreenPoint::new(t.client_x() as f64, t.client_y() as f64))
}

/// Live drop zone bounds, or the strip it will occupy before it is laid out.
fn drop_zone_rect(zone_ref: &NodeRef) -> ScreenRect {
    if let Some(el) = zone_ref.cast::<Element>() {
        return ScreenRect::from_dom(&el.get_bounding_client_rect());
    }
    drop_zone_strip(window_size())
}

fn overlay_host() -> Option<Element> {
    let body = web_sys::window()?.document()?.body()?;
    Some(body.into())
}

fn apply_navigation(
    nav: Navigation,
    ctrl: &Rc<RefCell<StackController>>,
    timers: &Rc<RefCell<Timers>>,
    refresh: &Callback<()>,
) {
    match nav {
        Navigation::Ignored => return,
        Navigation::Moved => {}
        Navigation::FlipStarted { token } => {
            let ctrl = ctrl.clone();
            let refresh_done = refresh.clone();
            timers.borrow_mut().flip = Some(Timeout::new(FLIP_DURATION_MS, move || {
                if ctrl.borrow_mut().finish_flip(token) {
                    refresh_done.emit(());
                }
            }));
        }
    }
    refresh.emit(());
}

#[function_component(DocumentFolder)]
pub fn document_folder(props: &DocumentFolderProps) -> Html {
    let ctrl = {
        let len = props.documents.len();
        use_mut_ref(move || StackController::new(len))
    };
    let timers = use_mut_ref(Timers::default);
    let props_ref = use_mut_ref(|| props.clone());
    let last_focus = use_mut_ref(|| 0_usize);
    let zone_ref = use_node_ref();
    let force = use_force_update();
    *props_ref.borrow_mut() = props.clone();

    let refresh: Callback<()> = {
        let ctrl = ctrl.clone();
        let props_ref = props_ref.clone();
        let last_focus = last_focus.clone();
        let force = force.clone();
        Callback::from(move |()| {
            let focus = ctrl.borrow().focus();
            if *last_focus.borrow() != focus {
                *last_focus.borrow_mut() = focus;
                props_ref.borrow().on_focus_change.emit(focus);
            }
            force.force_update();
        })
    };

    // Page list changed under us: re-clamp focus.
    {
        let ctrl = ctrl.clone();
        let refresh = refresh.clone();
        use_effect_with(props.documents.len(), move |len| {
            ctrl.borrow_mut().set_len(*len);
            refresh.emit(());
            || ()
        });
    }
    // Fullscreen viewer navigation drives focus.
    {
        let ctrl = ctrl.clone();
        let refresh = refresh.clone();
        use_effect_with(props.focus_request, move |req| {
            if let Some(i) = *req {
                if ctrl.borrow_mut().set_focus(i) {
                    refresh.emit(());
                }
            }
            || ()
        });
    }
    // Window listeners: drag tracking, release, arrow keys. Timers die with the component.
    {
        let ctrl = ctrl.clone();
        let timers = timers.clone();
        let props_ref = props_ref.clone();
        let zone_ref = zone_ref.clone();
        let refresh = refresh.clone();
        use_effect_with((), move |_| {
            let mut listeners = Vec::new();
            if let Some(window) = web_sys::window() {
                let move_listener = {
                    let ctrl = ctrl.clone();
                    let zone_ref = zone_ref.clone();
                    let refresh = refresh.clone();
                    EventListener::new(&window, "mousemove", move |event: &Event| {
                        let Some(e) = event.dyn_ref::<MouseEvent>() else {
                            return;
                        };
                        let zone = drop_zone_rect(&zone_ref);
                        if ctrl.borrow_mut().pointer_move(pointer_of(e), Some(zone)) {
                            refresh.emit(());
                        }
                    })
                };
                let up_listener = {
                    let ctrl = ctrl.clone();
                    let timers = timers.clone();
                    let props_ref = props_ref.clone();
                    let zone_ref = zone_ref.clone();
                    let refresh = refresh.clone();
                    EventListener::new(&window, "mouseup", move |event: &Event| {
                        if let Some(e) = event.dyn_ref::<MouseEvent>() {
                            let zone = drop_zone_rect(&zone_ref);
                            ctrl.borrow_mut().pointer_move(pointer_of(e), Some(zone));
                        }
                        timers.borrow_mut().hold = None;
                        let release = ctrl.borrow_mut().pointer_up();
                        match release {
                            Release::None => return,
                            Release::Dropped {
                                index,
                                delete: true,
                            } => {
                                clog(&format!("document stack: delete page {index}"));
                                props_ref.borrow().on_delete.emit(index);
                            }
                            _ => {}
                        }
                        refresh.emit(());
                    })
                };
                let key_listener = {
                    let ctrl = ctrl.clone();
                    let timers = timers.clone();
                    let refresh = refresh.clone();
                    EventListener::new_with_options(
                        &window,
                        "keydown",
                        EventListenerOptions::enable_prevent_default(),
                        move |event: &Event| {
                            let Some(e) = event.dyn_ref::<KeyboardEvent>() else {
                                return;
                            };
                            let nav = match e.key().as_str() {
                                "ArrowRight" => ctrl.borrow_mut().next(),
                                "ArrowLeft" => ctrl.borrow_mut().prev(),
                                _ => return,
                            };
                            if nav != Navigation::Ignored {
                                e.prevent_default();
                            }
                            apply_navigation(nav, &ctrl, &timers, &refresh);
                        },
                    )
                };
                listeners.push(move_listener);
                listeners.push(up_listener);
                listeners.push(key_listener);
            }
            move || {
                drop(listeners);
                let mut t = timers.borrow_mut();
                t.hold = None;
                t.flip = None;
            }
        });
    }

    let toggle_cover = {
        let ctrl = ctrl.clone();
        let timers = timers.clone();
        let props_ref = props_ref.clone();
        let refresh = refresh.clone();
        Callback::from(move |_: MouseEvent| {
            let props = props_ref.borrow().clone();
            if props.locked && !ctrl.borrow().is_open() {
                return;
            }
            let open = ctrl.borrow_mut().toggle_open();
            if !open {
                let mut t = timers.borrow_mut();
                t.hold = None;
                t.flip = None;
            }
            props.on_open_change.emit(open);
            refresh.emit(());
        })
    };

    let on_touch_start = {
        let ctrl = ctrl.clone();
        Callback::from(move |e: TouchEvent| {
            if let Some(p) = touch_point(e.touches()) {
                ctrl.borrow_mut().touch_start(p);
            }
        })
    };
    let on_touch_end = {
        let ctrl = ctrl.clone();
        let timers = timers.clone();
        let refresh = refresh.clone();
        Callback::from(move |e: TouchEvent| {
            let Some(p) = touch_point(e.changed_touches()) else {
                return;
            };
            let nav = ctrl.borrow_mut().touch_end(p);
            apply_navigation(nav, &ctrl, &timers, &refresh);
        })
    };

    let c = ctrl.borrow();
    let open = c.is_open();
    let drag = c.drag();
    let zone_visible = c.drop_zone_visible();
    let flipping = c.flipping_index();
    let viewport = window_size();

    let cards = props.documents.iter().enumerate().map(|(index, doc)| {
        let layout = c.card_layout(index, viewport);
        let dragged = drag.is_some_and(|d| d.index == index);
        let transition = if dragged {
            "none"
        } else if open && flipping == Some(index) {
            "transform 0.45s cubic-bezier(0.4, 0, 0.2, 1), opacity 0.45s ease"
        } else {
            "all 0.35s cubic-bezier(0.4, 0, 0.2, 1)"
        };
        let filter = if zone_visible && !dragged { "brightness(0.3)" } else { "none" };
        let cursor = if dragged {
            "grabbing"
        } else if open && index == c.focus() {
            "grab"
        } else {
            "default"
        };
        let style = format!(
            "position:absolute; left:50%; top:50%; width:60%; height:55%; overflow:hidden; pointer-events:auto; transform:{}; z-index:{}; box-shadow:{}; transition:{}; filter:{}; cursor:{};",
            layout.transform_css(),
            layout.z_index,
            layout.shadow_css(),
            transition,
            filter,
            cursor
        );
        let on_mouse_down = {
            let ctrl = ctrl.clone();
            let timers = timers.clone();
            let refresh = refresh.clone();
            Callback::from(move |e: MouseEvent| {
                let Some(token) = ctrl.borrow_mut().begin_hold(index, pointer_of(&e)) else {
                    return;
                };
                e.prevent_default();
                let ctrl = ctrl.clone();
                let refresh = refresh.clone();
                timers.borrow_mut().hold = Some(Timeout::new(HOLD_DELAY_MS, move || {
                    if ctrl.borrow_mut().hold_elapsed(token) {
                        refresh.emit(());
                    }
                }));
            })
        };
        let on_mouse_leave = {
            let ctrl = ctrl.clone();
            let timers = timers.clone();
            Callback::from(move |_: MouseEvent| {
                if ctrl.borrow_mut().cancel_hold() {
                    timers.borrow_mut().hold = None;
                }
            })
        };
        let on_click = {
            let ctrl = ctrl.clone();
            let cb = props.on_open_fullscreen.clone();
            Callback::from(move |_: MouseEvent| {
                if ctrl.borrow_mut().click(index) {
                    cb.emit(index);
                }
            })
        };
        html! {
            <div key={doc.id.clone()} {style} onmousedown={on_mouse_down} onmouseleave={on_mouse_leave} onclick={on_click}>
                <img src={doc.url.clone()} alt="" draggable="false"
                    style="width:100%; height:100%; object-fit:contain; pointer-events:none; background:transparent;" />
            </div>
        }
    }).collect::<Html>();

    let over_zone = drag.is_some_and(|d| d.over_drop_zone);
    let drop_zone = if zone_visible {
        let (bg, border, color, label) = if over_zone {
            ("rgba(239,68,68,0.3)", "4px solid #ef4444", "#ef4444", "Отпустите для удаления")
        } else {
            ("rgba(255,255,255,0.1)", "2px solid rgba(255,255,255,0.3)", "rgba(255,255,255,0.7)", "Перетащите сюда")
        };
        html! {<>
            <div style="position:fixed; inset:0; background:rgba(0,0,0,0.7); z-index:9998; pointer-events:none;"></div>
            <div ref={zone_ref.clone()} style={format!("position:fixed; right:0; top:0; bottom:0; width:{DROP_ZONE_WIDTH_PX}px; z-index:99999; display:flex; align-items:center; justify-content:center; pointer-events:auto; background:{bg}; border-left:{border}; transition:all 0.3s;")}>
                <div style={format!("display:flex; flex-direction:column; align-items:center; gap:16px; color:{color};")}>
                    <span style={format!("font-size:48px; transform:scale({});", if over_zone { 1.25 } else { 1.0 })}>{"🗑"}</span>
                    <p style="font-size:14px; text-align:center; margin:0;">{label}</p>
                </div>
            </div>
        </>}
    } else {
        html! {}
    };

    let cover_transform = if open { "rotateY(-180deg)" } else { "rotateY(0deg)" };
    let stack_z = if open { 1200 } else { 1050 };

    let visibility = if open { "visible" } else { "hidden" };
    let overlay = html! {
        <div style={format!("position:fixed; inset:0; display:flex; align-items:center; justify-content:center; pointer-events:none; perspective:1500px; transform-style:preserve-3d; z-index:{stack_z}; visibility:{visibility};")}>
            { drop_zone }
            <div style="position:relative; width:100%; height:100%; max-width:42rem; max-height:85vh; pointer-events:none; transform-style:preserve-3d;"
                ontouchstart={on_touch_start} ontouchend={on_touch_end}>
                { cards }
            </div>
        </div>
    };
    // Rendered into <body>: under the perspective folder box a fixed child
    // would be laid out against the box instead of the viewport.
    let overlay = match overlay_host() {
        Some(host) => yew::create_portal(overlay, host),
        None => overlay,
    };

    html! {
        <div class="folder-root" style="position:fixed; width:440px; height:560px; left:34vw; top:calc(50vh - 280px); perspective:2600px; transform-style:preserve-3d; z-index:1100;">
            <div style="position:absolute; inset:0; background:url(assets/folder_back.png) center/cover no-repeat; z-index:1;"></div>
            { overlay }
            <div onclick={toggle_cover}
                style={format!("position:absolute; inset:0; z-index:1000; cursor:pointer; transform-origin:left center; transform-style:preserve-3d; transition:transform 2.8s cubic-bezier(.25,.8,.25,1); transform:{cover_transform};")}>
                <div style="position:absolute; inset:0; background:url(assets/folder_cover.png) center/cover; transform:scaleX(-1); backface-visibility:hidden; z-index:2;"></div>
                <div style="position:absolute; inset:0; background:url(assets/folder_inside.png) center/cover; transform:rotateY(180deg); backface-visibility:hidden; z-index:1;"></div>
            </div>
        </div>
    }
}
