//! Widget applications: 512x512 PNG app tiles

use crate::error::Result;
use crate::linked;
use crate::listing::Page;
use crate::model::ResourceKind;
use crate::principal::Principal;
use crate::validate::LinkedPayload;
use crate::views::{LinkedView, LinkedWritten};

const KIND: ResourceKind = ResourceKind::WidgetApp;

pub fn list(principal: &Principal, query: &str) -> Result<Page<LinkedView>> {
    linked::list(principal, KIND, query)
}

pub fn retrieve(principal: &Principal, id: &str) -> Result<LinkedView> {
    linked::retrieve(principal, KIND, id)
}

pub fn create(principal: &Principal, payload: &LinkedPayload) -> Result<LinkedWritten> {
    linked::create(principal, KIND, payload)
}

pub fn update(principal: &Principal, id: &str, payload: &LinkedPayload) -> Result<LinkedWritten> {
    linked::update(principal, KIND, id, payload, false)
}

pub fn partial_update(principal: &Principal, id: &str, payload: &LinkedPayload) -> Result<LinkedWritten> {
    linked::update(principal, KIND, id, payload, true)
}

pub fn delete(principal: &Principal, id: &str) -> Result<()> {
    linked::delete(principal, KIND, id)
}

pub fn export(principal: &Principal, query: &str) -> Result<String> {
    linked::export(principal, KIND, query)
}
