use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct WelcomeGuideProps {
    pub show: bool,
    pub on_close: Callback<()>,
}

struct Step {
    title: &'static str,
    body: &'static str,
    icon: &'static str,
}

const STEPS: [Step; 5] = [
    Step {
        title: "Добро пожаловать, сталкер!",
        body: "Перед тобой рабочий стол: карта Зоны и папка с документами. Всё, что ты отметишь, сохранится между сессиями.",
        icon: "☢",
    },
    Step {
        title: "Карта",
        body: "Нажми на карту в углу стола, чтобы развернуть её. Колесо мыши и кнопки +/- меняют масштаб, перетаскивание двигает карту.",
        icon: "🗺",
    },
    Step {
        title: "Метки и рисование",
        body: "Выбери тип метки на панели и щёлкни по карте. Карандашом можно прокладывать маршруты, ластиком стирать их. Щелчок по метке открывает заметку.",
        icon: "✎",
    },
    Step {
        title: "Документы",
        body: "Открой папку, листай страницы стрелками или свайпом. Щелчок по странице разворачивает её на весь экран.",
        icon: "📁",
    },
    Step {
        title: "Удаление",
        body: "Зажми страницу на полсекунды и перетащи её в корзину справа, чтобы удалить. Кнопка + добавляет новый документ по ссылке.",
        icon: "🗑",
    },
];

#[function_component(WelcomeGuide)]
pub fn welcome_guide(props: &WelcomeGuideProps) -> Html {
    let step = use_state(|| 0_usize);
    if !props.show {
        return html! {};
    }
    let current = &STEPS[(*step).min(STEPS.len() - 1)];
    let next_label = if *step + 1 >= STEPS.len() { "Начать" } else { "Далее" };

    let close_btn = {
        let cb = props.on_close.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let next_btn = {
        let step = step.clone();
        let cb = props.on_close.clone();
        Callback::from(move |_| {
            if *step + 1 >= STEPS.len() {
                cb.emit(());
            } else {
                step.set(*step + 1);
            }
        })
    };
    let back_btn = {
        let step = step.clone();
        Callback::from(move |_| step.set(step.saturating_sub(1)))
    };
    let dots = (0..STEPS.len())
        .map(|i| {
            let bg = if i == *step { "#facc15" } else { "#4b5563" };
            html! { <span style={format!("width:8px; height:8px; border-radius:50%; background:{bg};")}></span> }
        })
        .collect::<Html>();

    html! {
        <div style="position:fixed; inset:0; z-index:100000; background:rgba(0,0,0,0.75); display:flex; align-items:center; justify-content:center;">
            <div style="background:rgba(20,20,18,0.95); border:2px solid #57534e; padding:28px 36px; border-radius:14px; max-width:520px; width:90%; box-shadow:0 6px 18px rgba(0,0,0,0.6); color:#e7e5e4; font-size:14px; line-height:1.4;">
                <div style="font-size:40px; text-align:center;">{current.icon}</div>
                <h2 style="margin:8px 0 12px 0; font-size:22px; color:#facc15; text-align:center;">{current.title}</h2>
                <p style="margin:4px 0 16px 0; text-align:center; opacity:0.85;">{current.body}</p>
                <div style="display:flex; gap:6px; justify-content:center; margin-bottom:16px;">{dots}</div>
                <div style="display:flex; gap:12px; justify-content:center;">
                    if *step > 0 {
                        <button onclick={back_btn}>{"Назад"}</button>
                    }
                    <button onclick={next_btn}>{next_label}</button>
                    <button onclick={close_btn}>{"Пропустить"}</button>
                </div>
            </div>
        </div>
    }
}
