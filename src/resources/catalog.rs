//! The resource screens of the console.

use crate::domain::item::ResourceItem;
use crate::domain::order::{OrderLine, OrderTotals, PaymentStatus, format_amount};
use crate::forms::FormError;
use crate::forms::draft::DraftState;
use crate::resources::{
    Endpoints, FieldKind, FieldSpec, FileReference, FilterSpec, HttpMethod, ListStyle,
    OptionSource, ResourceDescriptor,
};

pub static ALL: &[&ResourceDescriptor] = &[
    &USERS,
    &MOCK_TESTS,
    &WALLETS,
    &MEMBERS,
    &EVENTS,
    &ORDERS,
    &SLIDERS,
    &SUCCESS_STORIES,
    &ADS,
];

pub static USERS: ResourceDescriptor = ResourceDescriptor {
    key: "users",
    title: "Users",
    singular: "User",
    endpoints: Endpoints {
        list: "/api/v1/getAllUsers_p",
        list_style: ListStyle::JsonBody,
        create: Some("/api/v1/createUser"),
        update: Some("/api/v1/updateUser"),
        update_method: HttpMethod::Post,
        option_sources: &[
            OptionSource {
                path: "/api/v1/user-filter-data",
                method: HttpMethod::Post,
            },
            OptionSource {
                path: "/api/v1/role/getAllRoles",
                method: HttpMethod::Post,
            },
        ],
    },
    fields: &[
        FieldSpec::new("name", "Name", FieldKind::Text).required(),
        FieldSpec::new("email", "Email", FieldKind::Email).required(),
        FieldSpec::new("role_ids", "Roles", FieldKind::MultiSelect)
            .options("rolelist")
            .unlisted(),
        FieldSpec::new("roles", "Role", FieldKind::Text).display_only(),
        FieldSpec::new("status", "Status", FieldKind::Select).options("status_list"),
        FieldSpec::new("password", "Password", FieldKind::Password)
            .required_on_create()
            .unlisted(),
    ],
    filters: &[FilterSpec::server("user_id", "User").options("name_list")],
    upload_dir: None,
    file_reference: FileReference::Relative,
    prepare: None,
    decorate: None,
    line_items: None,
};

pub static MOCK_TESTS: ResourceDescriptor = ResourceDescriptor {
    key: "mock-tests",
    title: "Mock Tests",
    singular: "Mock Test",
    endpoints: Endpoints {
        list: "/api/v1/mock-test/list-paginate",
        list_style: ListStyle::Query,
        create: Some("/api/v1/mock-test/create"),
        update: Some("/api/v1/mock-test/update"),
        update_method: HttpMethod::Put,
        option_sources: &[],
    },
    fields: &[
        FieldSpec::new("created_at", "Date", FieldKind::Date).display_only(),
        FieldSpec::new("title", "Title", FieldKind::Text).required(),
        FieldSpec::new("desc", "Description", FieldKind::TextArea),
        FieldSpec::new("no_of_ques", "Questions", FieldKind::Number),
        FieldSpec::new("price", "Price", FieldKind::Number).required(),
        FieldSpec::new("file_path", "Image", FieldKind::File),
    ],
    filters: &[],
    upload_dir: Some("uploads/modules/general/"),
    file_reference: FileReference::Relative,
    prepare: None,
    decorate: None,
    line_items: None,
};

pub static WALLETS: ResourceDescriptor = ResourceDescriptor {
    key: "wallets",
    title: "Wallets",
    singular: "Wallet",
    endpoints: Endpoints {
        list: "/api/v1/wallet/list-paginate",
        list_style: ListStyle::Query,
        create: Some("/api/v1/wallet/create"),
        update: Some("/api/v1/wallet/update"),
        update_method: HttpMethod::Post,
        option_sources: &[OptionSource {
            path: "/api/v1/wallet/filter-data",
            method: HttpMethod::Get,
        }],
    },
    fields: &[
        FieldSpec::new("client_id", "Client", FieldKind::Select)
            .required()
            .fixed()
            .options("client_list")
            .unlisted(),
        FieldSpec::new("client.name", "Client", FieldKind::Text).display_only(),
        FieldSpec::new("balance", "Balance", FieldKind::Number).required(),
        FieldSpec::new("total_purchase", "Total Purchase", FieldKind::Number).display_only(),
        FieldSpec::new("total_refund", "Total Refund", FieldKind::Number).display_only(),
    ],
    filters: &[FilterSpec::server("client_id", "Client").options("client_list")],
    upload_dir: None,
    file_reference: FileReference::Relative,
    prepare: None,
    decorate: None,
    line_items: None,
};

pub static MEMBERS: ResourceDescriptor = ResourceDescriptor {
    key: "members",
    title: "Members",
    singular: "Member",
    endpoints: Endpoints {
        list: "/api/v1/members/list-paginate",
        list_style: ListStyle::Query,
        create: Some("/api/v1/members/create"),
        update: Some("/api/v1/members/update"),
        update_method: HttpMethod::Put,
        option_sources: &[OptionSource {
            path: "/api/v1/members/filter-data",
            method: HttpMethod::Get,
        }],
    },
    fields: &[
        FieldSpec::new("file_path", "Image", FieldKind::File),
        FieldSpec::new("name", "Name", FieldKind::Text).required(),
        FieldSpec::new("bio", "Bio", FieldKind::TextArea),
        FieldSpec::new("position", "Position", FieldKind::Text),
        FieldSpec::new("youtube_url", "Youtube URL", FieldKind::Url),
        FieldSpec::new("member_status_id", "Status", FieldKind::Select)
            .required()
            .options("member_status_list"),
    ],
    // The member directory is small; the status filter narrows the fetched
    // page in memory, the name filter goes to the API.
    filters: &[
        FilterSpec::server("member_id", "Member").options("name_list"),
        FilterSpec::server("member_status_id", "Status")
            .client()
            .options("member_status_list"),
    ],
    upload_dir: Some("uploads/modules/members/"),
    file_reference: FileReference::Relative,
    prepare: None,
    decorate: None,
    line_items: None,
};

pub static EVENTS: ResourceDescriptor = ResourceDescriptor {
    key: "events",
    title: "Events",
    singular: "Event",
    endpoints: Endpoints {
        list: "/api/v1/events/list-paginate",
        list_style: ListStyle::Query,
        create: Some("/api/v1/events/create"),
        update: Some("/api/v1/events/update"),
        update_method: HttpMethod::Put,
        option_sources: &[],
    },
    fields: &[
        FieldSpec::new("file_path", "Image", FieldKind::File),
        FieldSpec::new("title", "Title", FieldKind::Text).required(),
        FieldSpec::new("artist", "Artist", FieldKind::Text),
        FieldSpec::new("date", "Date", FieldKind::Date).required(),
        FieldSpec::new("description", "Description", FieldKind::TextArea),
        FieldSpec::new("location", "Location", FieldKind::Text),
    ],
    filters: &[],
    upload_dir: Some("uploads/modules/events/"),
    file_reference: FileReference::Relative,
    prepare: None,
    decorate: None,
    line_items: None,
};

pub static ORDERS: ResourceDescriptor = ResourceDescriptor {
    key: "orders",
    title: "Orders",
    singular: "Order",
    endpoints: Endpoints {
        list: "/api/v1/cart/list-paginate",
        list_style: ListStyle::Query,
        create: None,
        update: Some("/api/v1/cart/update"),
        update_method: HttpMethod::Put,
        option_sources: &[OptionSource {
            path: "/api/v1/cart/filter-data",
            method: HttpMethod::Get,
        }],
    },
    fields: &[
        FieldSpec::new("order_number", "Order Number", FieldKind::Text).display_only(),
        FieldSpec::new("customer_name", "Customer", FieldKind::Text).display_only(),
        FieldSpec::new("sub_total", "Sub Total", FieldKind::Number).fixed(),
        FieldSpec::new("delivery_charge", "Delivery Charge", FieldKind::Number),
        FieldSpec::new("paid_amount", "Paid", FieldKind::Number).required(),
        FieldSpec::new("total", "Total", FieldKind::Number).display_only(),
        FieldSpec::new("due", "Due", FieldKind::Number).display_only(),
        FieldSpec::new("payment_status", "Payment Status", FieldKind::Text).display_only(),
        FieldSpec::new("payment_method_id", "Payment Method", FieldKind::Select)
            .options("payment_method_list")
            .unlisted(),
        FieldSpec::new("order_status_id", "Order Status", FieldKind::Select)
            .required()
            .options("order_status_list"),
        FieldSpec::new("shipment_status_id", "Shipment Status", FieldKind::Select)
            .options("shipment_status_list"),
    ],
    filters: &[
        FilterSpec::server("order_number", "Order").options("order_number_list"),
        FilterSpec::server("order_status_id", "Order Status").options("order_status_list"),
        FilterSpec::server("payment_status_id", "Payment Status").options("payment_status_list"),
        FilterSpec::server("payment_method_id", "Payment Method").options("payment_method_list"),
        FilterSpec::server("shipment_status_id", "Shipment Status")
            .options("shipment_status_list"),
        FilterSpec::server("start_date", "From").date(),
        FilterSpec::server("end_date", "To").date(),
    ],
    upload_dir: None,
    file_reference: FileReference::Relative,
    prepare: Some(prepare_order),
    decorate: Some(decorate_order),
    line_items: Some(OrderLine::lines_of),
};

pub static SLIDERS: ResourceDescriptor = ResourceDescriptor {
    key: "sliders",
    title: "Sliders",
    singular: "Slider",
    endpoints: Endpoints {
        list: "/api/v1/home-main-slider/list-paginate",
        list_style: ListStyle::Query,
        create: Some("/api/v1/home-main-slider/create"),
        update: Some("/api/v1/home-main-slider/update"),
        update_method: HttpMethod::Put,
        option_sources: &[],
    },
    fields: &[
        FieldSpec::new("file_path", "Image", FieldKind::File).required(),
        FieldSpec::new("file_name", "Name", FieldKind::Text).required(),
    ],
    filters: &[],
    upload_dir: Some("uploads/modules/home-main-slider/"),
    file_reference: FileReference::Absolute,
    prepare: None,
    decorate: None,
    line_items: None,
};

pub static SUCCESS_STORIES: ResourceDescriptor = ResourceDescriptor {
    key: "success-stories",
    title: "Success Stories",
    singular: "Success Story",
    endpoints: Endpoints {
        list: "/api/v1/success-stories/list-paginate",
        list_style: ListStyle::Query,
        create: Some("/api/v1/success-stories/create"),
        update: Some("/api/v1/success-stories/update"),
        update_method: HttpMethod::Put,
        option_sources: &[OptionSource {
            path: "/api/v1/success-stories/filter-data",
            method: HttpMethod::Get,
        }],
    },
    fields: &[
        FieldSpec::new("posting_time", "Date", FieldKind::Date).required(),
        FieldSpec::new("headline", "Headline", FieldKind::Text).required(),
        FieldSpec::new("subheading", "Subheading", FieldKind::Text),
        FieldSpec::new("member_id", "Author", FieldKind::Select)
            .options("member_list")
            .unlisted(),
        FieldSpec::new("member.name", "Author", FieldKind::Text).display_only(),
        FieldSpec::new("details", "Details", FieldKind::TextArea),
        FieldSpec::new("file_path", "Image", FieldKind::File),
    ],
    filters: &[FilterSpec::server("member_id", "Author").options("member_list")],
    upload_dir: Some("uploads/modules/success-stories/"),
    file_reference: FileReference::Relative,
    prepare: None,
    decorate: None,
    line_items: None,
};

pub static ADS: ResourceDescriptor = ResourceDescriptor {
    key: "ads",
    title: "Ads",
    singular: "Ad",
    endpoints: Endpoints {
        list: "/api/v1/home-ads/list-paginate",
        list_style: ListStyle::Query,
        create: Some("/api/v1/home-ads/create"),
        update: Some("/api/v1/home-ads/update"),
        update_method: HttpMethod::Put,
        option_sources: &[],
    },
    fields: &[
        FieldSpec::new("file_path", "Image", FieldKind::File).required(),
        FieldSpec::new("file_name", "Name", FieldKind::Text).required(),
    ],
    filters: &[],
    upload_dir: Some("uploads/modules/home-ads/"),
    file_reference: FileReference::Absolute,
    prepare: None,
    decorate: None,
    line_items: None,
};

/// Fills the derived payment columns so the update carries consistent
/// totals: `total`, `due` and `payment_status_id`.
fn prepare_order(draft: &mut DraftState) -> Result<(), FormError> {
    let sub_total = draft.number("sub_total")?.unwrap_or(0.0);
    let delivery_charge = draft.number("delivery_charge")?.unwrap_or(0.0);
    let paid = draft.number("paid_amount")?.unwrap_or(0.0);
    let total = sub_total + delivery_charge;

    draft.set("total", total.to_string());
    draft.set("due", (total - paid).to_string());
    draft.set(
        "payment_status_id",
        PaymentStatus::derive(paid, total).id().to_string(),
    );

    Ok(())
}

fn decorate_order(item: &mut ResourceItem) {
    let totals = OrderTotals::of(item);
    let fields = &mut item.fields;
    fields.insert("total".to_string(), format_amount(totals.total).into());
    fields.insert("due".to_string(), format_amount(totals.due).into());
    fields.insert("payment_status".to_string(), totals.status.label().into());
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn order_preparation_derives_payment_columns() {
        let mut draft = DraftState::empty();
        draft.set("sub_total", "400");
        draft.set("delivery_charge", "100");
        draft.set("paid_amount", "200");

        prepare_order(&mut draft).unwrap();

        assert_eq!(draft.get("total"), Some("500"));
        assert_eq!(draft.get("due"), Some("300"));
        assert_eq!(draft.get("payment_status_id"), Some("3"));
    }

    #[test]
    fn order_preparation_rejects_garbage_amounts() {
        let mut draft = DraftState::empty();
        draft.set("paid_amount", "lots");

        assert!(matches!(
            prepare_order(&mut draft),
            Err(FormError::InvalidNumber(field)) if field == "paid_amount"
        ));
    }

    #[test]
    fn order_rows_gain_payment_info() {
        let mut item = ResourceItem::from_json(json!({
            "id": 9,
            "sub_total": 400,
            "delivery_charge": "100",
            "paid_amount": 500
        }))
        .unwrap();

        decorate_order(&mut item);

        assert_eq!(item.text("total"), "500");
        assert_eq!(item.text("due"), "0");
        assert_eq!(item.text("payment_status"), "Paid");
    }

    #[test]
    fn derived_order_columns_are_sent_on_update() {
        let item = ResourceItem::from_json(json!({
            "id": 9,
            "order_number": "ORD-9",
            "sub_total": 400,
            "delivery_charge": 100,
            "paid_amount": 0,
            "order_status_id": 1
        }))
        .unwrap();
        let mut draft = DraftState::from_item(&item, &ORDERS, str::to_string);
        draft.set("paid_amount", "200");
        prepare_order(&mut draft).unwrap();

        let payload = draft.into_payload(&ORDERS);

        assert_eq!(payload["total"], json!(500));
        assert_eq!(payload["due"], json!(300));
        assert_eq!(payload["payment_status_id"], json!(3));
        assert!(!payload.contains_key("order_number"));
        assert!(!payload.contains_key("payment_status"));
    }
}
