//! Weekly Chart Component
//!
//! Seven-day completion bars drawn by Chart.js (loaded from the CDN). The
//! widget is created on first render and afterwards updated in place.

use habitual::view::{BarChart, ChartUpdate};
use js_sys::{Array, Reflect};
use leptos::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlCanvasElement;

use crate::state::GlobalState;

#[wasm_bindgen]
extern "C" {
    /// A Chart.js chart instance
    #[wasm_bindgen(js_name = Chart)]
    type JsChart;

    #[wasm_bindgen(constructor, js_class = "Chart", catch)]
    fn new(canvas: &HtmlCanvasElement, config: &JsValue) -> Result<JsChart, JsValue>;

    #[wasm_bindgen(method, getter, js_class = "Chart")]
    fn data(this: &JsChart) -> JsValue;

    #[wasm_bindgen(method, js_class = "Chart")]
    fn update(this: &JsChart);

    #[wasm_bindgen(method, js_class = "Chart")]
    fn destroy(this: &JsChart);
}

/// Bar chart of habits completed per day
#[component]
pub fn WeeklyChart() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let frame = state.frame;
    let canvas_ref = create_node_ref::<html::Canvas>();
    let widget = store_value(None::<JsChart>);

    // Redraw whenever a new frame is rendered
    create_effect(move |_| {
        let latest = frame.with(|f| f.as_ref().map(|f| (f.chart.clone(), f.chart_update)));
        let Some((chart, update)) = latest else {
            return;
        };
        let Some(canvas) = canvas_ref.get() else {
            return;
        };

        let exists = widget.with_value(Option::is_some);
        let result = if exists && update == ChartUpdate::Updated {
            widget.with_value(|w| match w {
                Some(w) => update_in_place(w, &chart),
                None => Ok(()),
            })
        } else {
            widget.update_value(|w| {
                if let Some(old) = w.take() {
                    old.destroy();
                }
            });
            create_chart(&canvas, &chart).map(|w| widget.set_value(Some(w)))
        };

        if let Err(e) = result {
            web_sys::console::warn_1(&format!("Chart unavailable: {:?}", e).into());
        }
    });

    on_cleanup(move || {
        widget.update_value(|w| {
            if let Some(w) = w.take() {
                w.destroy();
            }
        });
    });

    view! {
        <section class="card chart-card">
            <h2>"Last 7 days"</h2>
            <canvas node_ref=canvas_ref width="400" height="200" />
        </section>
    }
}

fn create_chart(canvas: &HtmlCanvasElement, chart: &BarChart) -> Result<JsChart, JsValue> {
    let config = serde_json::json!({
        "type": "bar",
        "data": {
            "labels": chart.labels,
            "datasets": [{
                "label": "Habits Completed",
                "data": chart.counts,
                "backgroundColor": bar_colors(chart),
                "borderRadius": 6,
            }],
        },
        "options": {
            "responsive": true,
            "plugins": { "legend": { "display": false } },
            "scales": { "y": { "beginAtZero": true, "ticks": { "precision": 0 } } },
        },
    });

    JsChart::new(canvas, &js_sys::JSON::parse(&config.to_string())?)
}

fn update_in_place(widget: &JsChart, chart: &BarChart) -> Result<(), JsValue> {
    let data = widget.data();
    Reflect::set(&data, &"labels".into(), &to_js(&chart.labels)?)?;

    let datasets: Array = Reflect::get(&data, &"datasets".into())?.dyn_into()?;
    let dataset = datasets.get(0);
    Reflect::set(&dataset, &"data".into(), &to_js(&chart.counts)?)?;
    Reflect::set(&dataset, &"backgroundColor".into(), &to_js(&bar_colors(chart))?)?;

    widget.update();
    Ok(())
}

fn bar_colors(chart: &BarChart) -> Vec<String> {
    vec![chart.color.clone(); chart.counts.len()]
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let json = serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))?;
    js_sys::JSON::parse(&json)
}
