// ============================================================================
// ELEMENT HELPERS - Funciones básicas para manipular DOM
// ============================================================================

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlHeadElement, Window};

/// Obtener window global
pub fn window() -> Option<Window> {
    web_sys::window()
}

/// Obtener document
pub fn document() -> Option<Document> {
    window()?.document()
}

/// Obtener <body>
pub fn body() -> Result<HtmlElement, JsValue> {
    document()
        .and_then(|doc| doc.body())
        .ok_or_else(|| JsValue::from_str("No body"))
}

/// Obtener <head>
pub fn head() -> Result<HtmlHeadElement, JsValue> {
    document()
        .and_then(|doc| doc.head())
        .ok_or_else(|| JsValue::from_str("No head"))
}

/// Obtener elemento por ID
pub fn get_element_by_id(id: &str) -> Option<Element> {
    document()?.get_element_by_id(id)
}

/// Crear elemento
pub fn create_element(tag: &str) -> Result<Element, JsValue> {
    document()
        .ok_or_else(|| JsValue::from_str("No document"))
        .and_then(|doc| doc.create_element(tag))
}

/// Crear elemento ya convertido al tipo concreto
pub fn create_typed<T: JsCast>(tag: &str) -> Result<T, JsValue> {
    create_element(tag)?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("<{}> has an unexpected type", tag)))
}

/// Activar/desactivar una clase
pub fn toggle_class(element: &Element, class: &str, on: bool) -> Result<(), JsValue> {
    if on {
        element.class_list().add_1(class)
    } else {
        element.class_list().remove_1(class)
    }
}

/// Verificar si tiene clase
pub fn has_class(element: &Element, class: &str) -> bool {
    element.class_list().contains(class)
}

/// Agregar hijo
pub fn append_child(parent: &Element, child: &Element) -> Result<(), JsValue> {
    parent.append_child(child).map(|_| ())
}

/// Query selector (buscar elemento por selector CSS)
pub fn query_selector(selector: &str) -> Result<Option<Element>, JsValue> {
    document()
        .ok_or_else(|| JsValue::from_str("No document"))?
        .query_selector(selector)
}

/// Hijos directos que son HtmlElement
pub fn element_children(parent: &Element) -> Vec<HtmlElement> {
    let children = parent.children();
    (0..children.length())
        .filter_map(|i| children.item(i))
        .filter_map(|child| child.dyn_into::<HtmlElement>().ok())
        .collect()
}
