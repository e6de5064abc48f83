//! Regression coverage for order invariants, lifecycle and addresses.

use super::*;
use crate::domain::{MONEY_LIMIT, OrderItemId, ProductId};
use chrono::TimeZone;
use rstest::{fixture, rstest};

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn item(order_id: OrderId, quantity: i64, price: Decimal) -> OrderItem {
    OrderItem::new(OrderItemDraft {
        id: OrderItemId::random(),
        order_id,
        product_id: ProductId::random(),
        product_name: "Teapot".to_owned(),
        quantity,
        price,
    })
    .expect("valid item")
}

fn draft_with(items: Vec<OrderItem>, id: OrderId, total: Decimal) -> OrderDraft {
    OrderDraft {
        id,
        user_id: UserId::random(),
        items,
        total_amount: total,
        status: OrderStatus::Pending,
        shipping_address: ShippingAddress::parse("1 Main St, Springfield, IL, 62701, US")
            .expect("address"),
        notes: None,
        created_at: at(9),
        updated_at: at(9),
    }
}

#[fixture]
fn order() -> Order {
    let id = OrderId::random();
    let items = vec![
        item(id, 2, Decimal::new(1000, 2)),
        item(id, 1, Decimal::new(500, 2)),
    ];
    Order::new(draft_with(items, id, Decimal::new(2500, 2))).expect("valid order")
}

fn order_in(status: OrderStatus) -> Order {
    let mut draft = {
        let id = OrderId::random();
        draft_with(vec![item(id, 1, Decimal::ONE)], id, Decimal::ONE)
    };
    draft.status = status;
    Order::new(draft).expect("valid order")
}

#[rstest]
fn total_equals_sum_of_subtotals(order: Order) {
    assert_eq!(order.total_amount(), Decimal::new(25, 0));
    assert_eq!(order.calculate_total(), Some(order.total_amount()));
    assert_eq!(order.total_quantity(), 3);
}

#[rstest]
#[case(vec![(1, 1999), (3, 250), (7, 1)])]
#[case(vec![(1, 1)])]
#[case(vec![(1000, 99999), (2, 5)])]
fn total_matches_for_arbitrary_lines(#[case] lines: Vec<(i64, i64)>) {
    let id = OrderId::random();
    let items: Vec<OrderItem> = lines
        .iter()
        .map(|(qty, cents)| item(id, *qty, Decimal::new(*cents, 2)))
        .collect();
    let total: Decimal = lines
        .iter()
        .map(|(qty, cents)| Decimal::from(*qty) * Decimal::new(*cents, 2))
        .sum();
    let order = Order::new(draft_with(items, id, total)).expect("valid order");
    assert_eq!(order.total_amount(), total);
}

#[rstest]
fn empty_items_are_rejected() {
    let id = OrderId::random();
    let result = Order::new(draft_with(Vec::new(), id, Decimal::ONE));
    assert_eq!(result, Err(OrderValidationError::EmptyItems));
}

#[rstest]
#[case(Decimal::ZERO)]
#[case(Decimal::NEGATIVE_ONE)]
fn non_positive_total_is_rejected(#[case] total: Decimal) {
    let id = OrderId::random();
    let result = Order::new(draft_with(vec![item(id, 1, Decimal::ONE)], id, total));
    assert_eq!(result, Err(OrderValidationError::NonPositiveTotal));
}

#[rstest]
fn mismatched_total_is_rejected() {
    let id = OrderId::random();
    let result = Order::new(draft_with(vec![item(id, 2, Decimal::ONE)], id, Decimal::ONE));
    assert_eq!(
        result,
        Err(OrderValidationError::TotalMismatch {
            expected: Decimal::TWO,
            actual: Decimal::ONE
        })
    );
}

#[rstest]
fn total_beyond_money_limit_is_rejected() {
    let id = OrderId::random();
    let price = Decimal::new(999_999_999_999, 2);
    let items = vec![item(id, 2, price)];
    let total = price * Decimal::TWO;
    assert_eq!(
        Order::new(draft_with(items, id, total)),
        Err(OrderValidationError::TotalOutOfRange)
    );
}

#[rstest]
fn trailing_zeros_do_not_count_as_precision() {
    let id = OrderId::random();
    let line = item(id, 3, Decimal::new(12_500, 3));
    assert_eq!(line.subtotal(), Decimal::new(375, 1));
}

#[rstest]
fn items_from_other_orders_are_rejected() {
    let id = OrderId::random();
    let stray = item(OrderId::random(), 1, Decimal::ONE);
    let result = Order::new(draft_with(vec![stray], id, Decimal::ONE));
    assert_eq!(result, Err(OrderValidationError::ForeignItem));
}

#[rstest]
#[case(0, Decimal::ONE, OrderValidationError::NonPositiveQuantity)]
#[case(-2, Decimal::ONE, OrderValidationError::NonPositiveQuantity)]
#[case(1, Decimal::ZERO, OrderValidationError::NonPositiveItemPrice)]
#[case(i64::from(u32::MAX) + 1, Decimal::ONE, OrderValidationError::QuantityOutOfRange)]
#[case(i64::from(i32::MAX) + 1, Decimal::ONE, OrderValidationError::QuantityOutOfRange)]
#[case(3, Decimal::new(333, 3), OrderValidationError::ItemPrice(AmountError::TooPrecise))]
#[case(1, Decimal::new(1, 3), OrderValidationError::ItemPrice(AmountError::TooPrecise))]
#[case(2, Decimal::MAX, OrderValidationError::ItemPrice(AmountError::OutOfRange))]
#[case(1, MONEY_LIMIT, OrderValidationError::ItemPrice(AmountError::OutOfRange))]
fn item_rejects_invalid_lines(
    #[case] quantity: i64,
    #[case] price: Decimal,
    #[case] expected: OrderValidationError,
) {
    let result = OrderItem::new(OrderItemDraft {
        id: OrderItemId::random(),
        order_id: OrderId::random(),
        product_id: ProductId::random(),
        product_name: "Teapot".to_owned(),
        quantity,
        price,
    });
    assert_eq!(result, Err(expected));
}

#[rstest]
#[case(OrderStatus::Pending, true)]
#[case(OrderStatus::Confirmed, true)]
#[case(OrderStatus::Processing, false)]
#[case(OrderStatus::Shipped, false)]
#[case(OrderStatus::Delivered, false)]
#[case(OrderStatus::Cancelled, false)]
fn cancel_only_from_pending_or_confirmed(#[case] status: OrderStatus, #[case] allowed: bool) {
    let order = order_in(status);
    assert_eq!(order.can_be_cancelled(), allowed);
    let result = order.cancel(at(10));
    if allowed {
        let cancelled = result.expect("cancellable");
        assert_eq!(cancelled.status(), OrderStatus::Cancelled);
        assert_eq!(cancelled.updated_at(), at(10));
    } else {
        assert_eq!(result, Err(OrderValidationError::NotCancellable { status }));
    }
}

#[rstest]
#[case(OrderStatus::Pending, OrderStatus::Confirmed, true)]
#[case(OrderStatus::Pending, OrderStatus::Cancelled, true)]
#[case(OrderStatus::Pending, OrderStatus::Shipped, false)]
#[case(OrderStatus::Confirmed, OrderStatus::Processing, true)]
#[case(OrderStatus::Confirmed, OrderStatus::Pending, false)]
#[case(OrderStatus::Processing, OrderStatus::Shipped, true)]
#[case(OrderStatus::Processing, OrderStatus::Cancelled, false)]
#[case(OrderStatus::Shipped, OrderStatus::Delivered, true)]
#[case(OrderStatus::Delivered, OrderStatus::Cancelled, false)]
#[case(OrderStatus::Cancelled, OrderStatus::Pending, false)]
#[case(OrderStatus::Pending, OrderStatus::Pending, false)]
fn update_status_follows_lifecycle(
    #[case] from: OrderStatus,
    #[case] to: OrderStatus,
    #[case] allowed: bool,
) {
    let result = order_in(from).update_status(to, at(11));
    match result {
        Ok(order) => {
            assert!(allowed, "{from} -> {to} should be rejected");
            assert_eq!(order.status(), to);
        }
        Err(err) => {
            assert!(!allowed, "{from} -> {to} should be accepted");
            assert_eq!(err, OrderValidationError::InvalidTransition { from, to });
        }
    }
}

#[rstest]
fn update_status_keeps_original_untouched(order: Order) {
    let original = order.clone();
    let confirmed = order
        .update_status(OrderStatus::Confirmed, at(12))
        .expect("valid transition");
    assert_eq!(original.status(), OrderStatus::Pending);
    assert_eq!(confirmed.status(), OrderStatus::Confirmed);
    assert_eq!(confirmed.items(), original.items());
}

#[rstest]
fn terminal_states_are_flagged() {
    assert!(OrderStatus::Delivered.is_terminal());
    assert!(OrderStatus::Cancelled.is_terminal());
    assert!(!OrderStatus::Shipped.is_terminal());
}

#[rstest]
fn address_change_is_limited_to_pending_orders(order: Order) {
    let new_address = ShippingAddress::new("2 High St", "Leeds", "", "LS1", "UK").expect("valid");
    let moved = order
        .with_shipping_address(new_address.clone(), at(13))
        .expect("pending orders accept address changes");
    assert_eq!(moved.shipping_address(), &new_address);

    let confirmed = moved
        .update_status(OrderStatus::Confirmed, at(14))
        .expect("valid transition");
    assert_eq!(
        confirmed.with_shipping_address(new_address, at(15)),
        Err(OrderValidationError::AddressLocked {
            status: OrderStatus::Confirmed
        })
    );
}

#[rstest]
fn address_round_trips_through_its_string_form() {
    let address = ShippingAddress::new("1 Main St", "Springfield", "IL", "62701", "US")
        .expect("valid address");
    let reparsed = ShippingAddress::parse(&address.to_string()).expect("parse");
    assert_eq!(reparsed, address);
}

#[rstest]
#[case("", ["", "", "", "", ""])]
#[case("1 Main St", ["1 Main St", "", "", "", ""])]
#[case("1 Main St, Springfield", ["1 Main St", "Springfield", "", "", ""])]
#[case("a,, b, c, d, e", ["a,", "b", "c", "d", "e"])]
fn parse_defaults_missing_components(#[case] raw: &str, #[case] expected: [&str; 5]) {
    let address = ShippingAddress::parse(raw).expect("parse");
    assert_eq!(
        [
            address.street(),
            address.city(),
            address.state(),
            address.zip_code(),
            address.country()
        ],
        expected
    );
}

#[rstest]
fn parse_rejects_extra_components() {
    let err = ShippingAddress::parse("Flat 2, 1 Main St, Springfield, IL, 62701, US")
        .expect_err("six parts");
    assert_eq!(err, ShippingAddressError::TooManyParts { found: 6 });
}

#[rstest]
fn components_containing_the_delimiter_are_rejected() {
    let err = ShippingAddress::new("Flat 2, 1 Main St", "Springfield", "IL", "62701", "US")
        .expect_err("delimiter in street");
    assert_eq!(err, ShippingAddressError::DelimiterInField { field: "street" });
}

#[rstest]
fn status_names_round_trip() {
    for status in [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ] {
        assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
    }
    assert!("lost".parse::<OrderStatus>().is_err());
}
