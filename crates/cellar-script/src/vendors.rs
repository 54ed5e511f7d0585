//! Vendor script tables
//!
//! Every supported modem uses three scripts. The init script is sent over
//! the raw transport after the modem has started up and must configure it to
//! use multiplexed mode. The dial script is sent on the data channel in
//! command mode and must request the modem dial out and put the channel into
//! data mode. The periodic script refreshes registration state on the
//! supervision channel.
//!
//! These tables are data; keeping them here keeps the state machine
//! vendor-agnostic.

use std::time::Duration;

use crate::script::{ChatCommand, ChatScript, FieldHandler, MatchPattern, ScriptSet};

fn ok() -> MatchPattern {
    MatchPattern::exact("OK")
}

fn allow() -> Vec<MatchPattern> {
    vec![MatchPattern::exact("OK"), MatchPattern::exact("ERROR")]
}

fn abort_matches() -> Vec<MatchPattern> {
    vec![MatchPattern::exact("ERROR")]
}

fn dial_abort_matches() -> Vec<MatchPattern> {
    vec![
        MatchPattern::exact("ERROR"),
        MatchPattern::exact("BUSY"),
        MatchPattern::exact("NO ANSWER"),
        MatchPattern::exact("NO CARRIER"),
        MatchPattern::exact("NO DIALTONE"),
    ]
}

/// Registration report patterns applied to every line the script engine sees,
/// solicited or unsolicited
pub fn unsolicited_matches() -> Vec<MatchPattern> {
    vec![
        MatchPattern::exact("+CREG: ")
            .separators(",")
            .handler(FieldHandler::Registration),
        MatchPattern::exact("+CEREG: ")
            .separators(",")
            .handler(FieldHandler::Registration),
        MatchPattern::exact("+CGREG: ")
            .separators(",")
            .handler(FieldHandler::Registration),
    ]
}

/// The shared init preamble: disable echo, park the radio, enable verbose
/// errors and registration reports, then read the identity fields
fn init_preamble() -> Vec<ChatCommand> {
    vec![
        ChatCommand::expect("ATE0", ok()),
        ChatCommand::expect("AT+CFUN=4", ok()),
        ChatCommand::expect("AT+CMEE=1", ok()),
        ChatCommand::expect("AT+CREG=1", ok()),
        ChatCommand::expect("AT+CGREG=1", ok()),
        ChatCommand::expect("AT+CEREG=1", ok()),
        ChatCommand::expect("AT+CREG?", ok()),
        ChatCommand::expect("AT+CEREG?", ok()),
        ChatCommand::expect("AT+CGREG?", ok()),
        ChatCommand::expect("AT+CGSN", MatchPattern::any().handler(FieldHandler::Imei)),
        ChatCommand::expect_line(ok()),
        ChatCommand::expect("AT+CGMM", MatchPattern::any().handler(FieldHandler::ModelId)),
        ChatCommand::expect_line(ok()),
    ]
}

fn full_identity() -> Vec<ChatCommand> {
    vec![
        ChatCommand::expect(
            "AT+CGMI",
            MatchPattern::any().handler(FieldHandler::Manufacturer),
        ),
        ChatCommand::expect_line(ok()),
        ChatCommand::expect(
            "AT+CGMR",
            MatchPattern::any().handler(FieldHandler::FwVersion),
        ),
        ChatCommand::expect_line(ok()),
        ChatCommand::expect("AT+CIMI", MatchPattern::any().handler(FieldHandler::Imsi)),
        ChatCommand::expect_line(ok()),
    ]
}

fn dial_script(apn: &str) -> ChatScript {
    ChatScript::new(
        "dial",
        vec![
            ChatCommand::expect_any("AT+CGACT=0,1", allow()),
            ChatCommand::expect(format!("AT+CGDCONT=1,\"IP\",\"{apn}\""), ok()),
            ChatCommand::expect("AT+CFUN=1", ok()),
            ChatCommand::no_reply("ATD*99***1#", Duration::ZERO),
        ],
        dial_abort_matches(),
        Duration::from_secs(10),
    )
}

fn periodic_script(with_csq: bool) -> ChatScript {
    let mut commands = vec![
        ChatCommand::expect("AT+CREG?", ok()),
        ChatCommand::expect("AT+CEREG?", ok()),
        ChatCommand::expect("AT+CGREG?", ok()),
    ];

    if with_csq {
        commands.push(ChatCommand::expect(
            "AT+CSQ",
            MatchPattern::exact("+CSQ: ")
                .separators(",")
                .handler(FieldHandler::SignalQuality),
        ));
    }

    ChatScript::new("periodic", commands, abort_matches(), Duration::from_secs(4))
}

/// Quectel BG95 script set
pub fn quectel_bg95(apn: &str) -> ScriptSet {
    let mut init = init_preamble();
    init.extend(full_identity());
    init.push(ChatCommand::expect(
        "AT+QCCID",
        MatchPattern::exact("+QCCID: ").handler(FieldHandler::Iccid),
    ));
    init.push(ChatCommand::expect_line(ok()));
    init.push(ChatCommand::no_reply(
        "AT+CMUX=0,0,5,127",
        Duration::from_millis(300),
    ));

    ScriptSet {
        init: ChatScript::new("init", init, abort_matches(), Duration::from_secs(10)),
        dial: dial_script(apn),
        periodic: periodic_script(false),
    }
}

/// Quectel EG25-G script set
pub fn quectel_eg25_g(apn: &str) -> ScriptSet {
    let mut init = init_preamble();
    init.extend(full_identity());
    init.push(ChatCommand::no_reply(
        "AT+CMUX=0,0,5,127,10,3,30,10,2",
        Duration::from_millis(100),
    ));

    ScriptSet {
        init: ChatScript::new("init", init, abort_matches(), Duration::from_secs(10)),
        dial: dial_script(apn),
        periodic: periodic_script(true),
    }
}

/// SimCom SIM7080 script set
///
/// The modem needs a few bare AT nudges before it answers; the shortened
/// identity block matches what the hardware reports reliably.
pub fn simcom_sim7080(apn: &str) -> ScriptSet {
    let mut init = vec![
        ChatCommand::no_reply("AT", Duration::from_millis(100)),
        ChatCommand::no_reply("AT", Duration::from_millis(100)),
        ChatCommand::no_reply("AT", Duration::from_millis(100)),
        ChatCommand::no_reply("AT", Duration::from_millis(100)),
    ];
    init.extend(init_preamble());
    init.push(ChatCommand::no_reply(
        "AT+CMUX=0,0,5,127",
        Duration::from_millis(300),
    ));

    ScriptSet {
        init: ChatScript::new("init", init, abort_matches(), Duration::from_secs(10)),
        dial: dial_script(apn),
        periodic: periodic_script(false),
    }
}

/// u-blox SARA-R4 script set
pub fn ublox_sara_r4(apn: &str) -> ScriptSet {
    let mut init = vec![
        ChatCommand::no_reply("AT", Duration::from_millis(100)),
        ChatCommand::no_reply("AT", Duration::from_millis(100)),
        ChatCommand::no_reply("AT", Duration::from_millis(100)),
        ChatCommand::no_reply("AT", Duration::from_millis(100)),
    ];
    init.extend(init_preamble());
    init.push(ChatCommand::expect("AT+CMUX=0,0,5,127", ok()));

    ScriptSet {
        init: ChatScript::new("init", init, abort_matches(), Duration::from_secs(10)),
        dial: dial_script(apn),
        periodic: periodic_script(false),
    }
}
