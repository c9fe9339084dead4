mod helpers;
mod predict_form;
