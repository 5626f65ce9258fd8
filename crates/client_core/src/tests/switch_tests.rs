use super::*;
use crate::test_support::{switch_sensor, RecordingSender};
use shared::protocol::{ActionPayload, ActionResult, EchoedAction};
use tokio::sync::Notify;

fn switch_values(device: &Device) -> Vec<(String, SwitchValue)> {
    device
        .actions
        .iter()
        .map(|action| match action.payload {
            ActionPayload::Switch(value) => (action.sensor_id.to_string(), value),
            other => panic!("unexpected payload {other:?}"),
        })
        .collect()
}

#[test]
fn click_flips_off_to_on_and_on_to_off() {
    let mut state = SwitchState::default();
    assert_eq!(state.click(), Some(SwitchValue::On));
    state.settle(SwitchPayload::On);
    assert_eq!(state.click(), Some(SwitchValue::Off));
}

#[test]
fn click_from_unknown_requests_off() {
    let mut state = SwitchState {
        payload: SwitchPayload::Unknown,
        loading: false,
    };
    assert_eq!(state.click(), Some(SwitchValue::Off));
}

#[test]
fn input_is_ignored_while_loading() {
    let mut state = SwitchState::default();
    assert_eq!(state.mount(), SwitchValue::Off);
    assert!(state.loading);
    assert_eq!(state.label(), "Loading");
    assert_eq!(state.click(), None);
    assert_eq!(state.request(SwitchValue::On), None);

    state.settle(SwitchPayload::Off);
    assert_eq!(state.label(), "OFF");
    assert_eq!(state.click(), Some(SwitchValue::On));
}

#[test]
fn reconcile_requires_matching_ok_entry() {
    let sensor = SensorId::from("sensor-01");

    let ok = Ok(ActionizerResponse::Success(vec![ActionResult::ok(0)]));
    assert_eq!(reconcile(SwitchValue::On, 0, &sensor, &ok), SwitchPayload::On);

    let missing = Ok(ActionizerResponse::empty());
    assert_eq!(
        reconcile(SwitchValue::On, 0, &sensor, &missing),
        SwitchPayload::Unknown
    );

    let failed = Ok(ActionizerResponse::Success(vec![ActionResult {
        action_index: Some(0),
        status: Some(500),
        error: Some(3),
        message: Some("device offline".to_string()),
        ..ActionResult::default()
    }]));
    assert_eq!(
        reconcile(SwitchValue::On, 0, &sensor, &failed),
        SwitchPayload::Unknown
    );

    let error_code = Ok(ActionizerResponse::error(503));
    assert_eq!(
        reconcile(SwitchValue::Off, 0, &sensor, &error_code),
        SwitchPayload::Unknown
    );
}

#[test]
fn reconcile_prefers_echoed_sensor_over_index() {
    let sensor = SensorId::from("sensor-02");
    let outcome = Ok(ActionizerResponse::Success(vec![ActionResult {
        action_index: Some(0),
        status: Some(200),
        action: Some(EchoedAction {
            sensor_id: Some(SensorId::from("sensor-02")),
        }),
        ..ActionResult::default()
    }]));

    assert_eq!(reconcile(SwitchValue::On, 1, &sensor, &outcome), SwitchPayload::On);
    assert_eq!(
        reconcile(SwitchValue::On, 0, &SensorId::from("sensor-01"), &outcome),
        SwitchPayload::Unknown
    );
}

#[tokio::test]
async fn mount_forces_off_with_one_request() {
    let sender = Arc::new(RecordingSender::accepting());
    let control = SwitchControl::new(switch_sensor("dev-1", "sensor-01", "Lamp"), sender.clone());

    let state = control.mount().await;

    assert_eq!(state, SwitchState::default());
    let requests = sender.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].len(), 1);
    assert_eq!(requests[0][0].device_id, DeviceId::from("dev-1"));
    assert_eq!(
        switch_values(&requests[0][0]),
        vec![("sensor-01".to_string(), SwitchValue::Off)]
    );
}

#[tokio::test]
async fn clicks_while_loading_send_nothing() {
    let gate = Arc::new(Notify::new());
    let sender = Arc::new(RecordingSender::accepting().gated(gate.clone()));
    let control = SwitchControl::new(switch_sensor("dev-1", "sensor-01", "Lamp"), sender.clone());

    let pending = tokio::spawn({
        let control = control.clone();
        async move { control.click().await }
    });
    sender.started.notified().await;

    assert!(control.state().await.loading);
    assert_eq!(control.click().await, None);
    assert_eq!(control.click().await, None);

    gate.notify_one();
    let settled = pending.await.expect("join").expect("click accepted");

    assert_eq!(
        settled,
        SwitchState {
            payload: SwitchPayload::On,
            loading: false
        }
    );
    assert_eq!(sender.requests().len(), 1);
}

#[tokio::test]
async fn missing_entry_settles_unknown_and_next_click_sends_off() {
    let sender = Arc::new(RecordingSender::responding(|_| {
        Ok(ActionizerResponse::empty())
    }));
    let control = SwitchControl::new(switch_sensor("dev-1", "sensor-01", "Lamp"), sender.clone());

    let state = control.click().await.expect("click accepted");
    assert_eq!(state.payload, SwitchPayload::Unknown);
    assert_eq!(state.label(), "??");

    control.click().await.expect("click accepted");
    let requests = sender.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        switch_values(&requests[0][0]),
        vec![("sensor-01".to_string(), SwitchValue::On)]
    );
    assert_eq!(
        switch_values(&requests[1][0]),
        vec![("sensor-01".to_string(), SwitchValue::Off)]
    );
}

#[tokio::test]
async fn transport_failure_settles_unknown() {
    let sender = Arc::new(RecordingSender::failing());
    let control = SwitchControl::new(switch_sensor("dev-1", "sensor-01", "Lamp"), sender);

    let state = control.mount().await;

    assert_eq!(
        state,
        SwitchState {
            payload: SwitchPayload::Unknown,
            loading: false
        }
    );
}

#[tokio::test]
async fn error_code_response_settles_unknown() {
    let sender = Arc::new(RecordingSender::responding(|_| {
        Ok(ActionizerResponse::error(500))
    }));
    let control = SwitchControl::new(switch_sensor("dev-1", "sensor-01", "Lamp"), sender);

    let state = control.click().await.expect("click accepted");

    assert_eq!(state.payload, SwitchPayload::Unknown);
}

#[tokio::test]
async fn device_sync_reconciles_each_switch_by_its_own_entry() {
    // Only the second action succeeds.
    let sender = Arc::new(RecordingSender::responding(|_| {
        Ok(ActionizerResponse::Success(vec![
            ActionResult {
                action_index: Some(0),
                status: Some(500),
                ..ActionResult::default()
            },
            ActionResult::ok(1),
        ]))
    }));
    let sensors = vec![
        switch_sensor("dev-1", "sensor-01", "Lamp"),
        switch_sensor("dev-1", "sensor-02", "Fan"),
        switch_sensor("dev-2", "sensor-03", "Pump"),
    ];
    let board = SwitchBoard::new(&sensors, sender.clone());

    let settled = board
        .sync_device(&DeviceId::from("dev-1"), SwitchValue::On)
        .await;

    assert_eq!(
        settled,
        vec![
            (
                SensorId::from("sensor-01"),
                SwitchState {
                    payload: SwitchPayload::Unknown,
                    loading: false
                }
            ),
            (
                SensorId::from("sensor-02"),
                SwitchState {
                    payload: SwitchPayload::On,
                    loading: false
                }
            ),
        ]
    );

    let requests = sender.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].len(), 1);
    assert_eq!(
        switch_values(&requests[0][0]),
        vec![
            ("sensor-01".to_string(), SwitchValue::On),
            ("sensor-02".to_string(), SwitchValue::On),
        ]
    );

    let untouched = board
        .control(&SensorId::from("sensor-03"))
        .expect("pump control");
    assert_eq!(untouched.state().await, SwitchState::default());
}

#[tokio::test]
async fn device_sync_skips_busy_switches() {
    let gate = Arc::new(Notify::new());
    let sender = Arc::new(RecordingSender::accepting().gated(gate.clone()));
    let sensors = vec![
        switch_sensor("dev-1", "sensor-01", "Lamp"),
        switch_sensor("dev-1", "sensor-02", "Fan"),
    ];
    let board = Arc::new(SwitchBoard::new(&sensors, sender.clone()));
    let lamp = board
        .control(&SensorId::from("sensor-01"))
        .expect("lamp")
        .clone();

    let click = tokio::spawn(async move { lamp.click().await });
    sender.started.notified().await;

    let sync = tokio::spawn({
        let board = board.clone();
        async move {
            board
                .sync_device(&DeviceId::from("dev-1"), SwitchValue::Off)
                .await
        }
    });
    sender.started.notified().await;
    gate.notify_waiters();

    let lamp_state = click.await.expect("join").expect("click accepted");
    let settled = sync.await.expect("join");

    assert_eq!(lamp_state.payload, SwitchPayload::On);
    assert_eq!(
        settled,
        vec![(
            SensorId::from("sensor-02"),
            SwitchState {
                payload: SwitchPayload::Off,
                loading: false
            }
        )]
    );
    let requests = sender.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        switch_values(&requests[1][0]),
        vec![("sensor-02".to_string(), SwitchValue::Off)]
    );
}

#[tokio::test]
async fn board_mounts_every_switch_and_renders_labels() {
    let sender = Arc::new(RecordingSender::accepting());
    let sensors = vec![
        switch_sensor("dev-1", "sensor-01", "Lamp"),
        SensorInfo {
            sensor_type: SensorType::Distance,
            ..switch_sensor("dev-1", "sensor-02", "Range")
        },
        switch_sensor("dev-2", "sensor-03", "Pump"),
        switch_sensor("dev-2", "sensor-04", "Heater"),
    ];
    let board = SwitchBoard::new(&sensors, sender.clone());
    assert_eq!(board.controls().len(), 3);

    let states = board.mount_all().await;
    assert_eq!(states, vec![SwitchState::default(); 3]);
    assert_eq!(sender.requests().len(), 3);

    let heater = board
        .control(&SensorId::from("sensor-04"))
        .expect("heater");
    heater.click().await.expect("click accepted");

    assert_eq!(
        board.render().await,
        vec![
            "Lamp [sensor-01]: OFF".to_string(),
            "Pump [sensor-03]: OFF".to_string(),
            "Heater [sensor-04]: ON".to_string(),
        ]
    );
}

#[tokio::test]
async fn empty_board_renders_placeholder() {
    let sender = Arc::new(RecordingSender::accepting());
    let board = SwitchBoard::new(&[], sender.clone());

    assert!(board.is_empty());
    assert!(board.mount_all().await.is_empty());
    assert_eq!(board.render().await, vec![NO_SENSORS_MESSAGE.to_string()]);
    assert!(sender.requests().is_empty());
}

#[tokio::test]
async fn clicking_one_of_three_switches_only_touches_that_sensor() {
    let sender = Arc::new(RecordingSender::accepting());
    let sensors = vec![
        switch_sensor("dev-1", "sensor-01", "One"),
        switch_sensor("dev-1", "sensor-02", "Two"),
        switch_sensor("dev-1", "sensor-03", "Three"),
    ];
    let board = SwitchBoard::new(&sensors, sender.clone());

    board.mount_all().await;
    let mounts = sender.requests();
    assert_eq!(mounts.len(), 3);
    for batch in &mounts {
        assert_eq!(switch_values(&batch[0])[0].1, SwitchValue::Off);
    }

    let second = board.control(&SensorId::from("sensor-02")).expect("second");
    let state = second.click().await.expect("click accepted");
    assert_eq!(state.label(), "ON");

    let requests = sender.requests();
    assert_eq!(requests.len(), 4);
    assert_eq!(
        serde_json::to_value(&requests[3][0].actions).expect("serialize"),
        serde_json::json!([{ "sensorId": "sensor-02", "type": "SWITCH", "payload": 1 }])
    );
    assert_eq!(
        board.render().await,
        vec![
            "One [sensor-01]: OFF".to_string(),
            "Two [sensor-02]: ON".to_string(),
            "Three [sensor-03]: OFF".to_string(),
        ]
    );
}

#[tokio::test]
async fn device_sync_marks_only_the_omitted_entry_unknown() {
    let sender = Arc::new(RecordingSender::responding(|_| {
        Ok(ActionizerResponse::Success(vec![
            ActionResult::ok(0),
            ActionResult::ok(2),
        ]))
    }));
    let sensors = vec![
        switch_sensor("dev-1", "sensor-01", "One"),
        switch_sensor("dev-1", "sensor-02", "Two"),
        switch_sensor("dev-1", "sensor-03", "Three"),
    ];
    let board = SwitchBoard::new(&sensors, sender.clone());

    let settled = board
        .sync_device(&DeviceId::from("dev-1"), SwitchValue::On)
        .await;

    let payloads: Vec<_> = settled
        .iter()
        .map(|(sensor_id, state)| (sensor_id.to_string(), state.payload))
        .collect();
    assert_eq!(
        payloads,
        vec![
            ("sensor-01".to_string(), SwitchPayload::On),
            ("sensor-02".to_string(), SwitchPayload::Unknown),
            ("sensor-03".to_string(), SwitchPayload::On),
        ]
    );
    assert_eq!(sender.requests().len(), 1);
    assert_eq!(
        board.render().await,
        vec![
            "One [sensor-01]: ON".to_string(),
            "Two [sensor-02]: ??".to_string(),
            "Three [sensor-03]: ON".to_string(),
        ]
    );
}
