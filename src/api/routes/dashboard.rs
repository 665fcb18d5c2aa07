//! Dashboard Route
//!
//! - GET / - The single-page dashboard
//!
//! The page holds no logic of its own beyond wiring widgets to the `/ws`
//! session: every control change is sent as a client message and every
//! `render` message replaces the chart, the player picker and the status line.

use axum::response::Html;

/// GET /
pub async fn index() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

pub const DASHBOARD_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Damage Timeline</title>
    <script src="https://cdn.plot.ly/plotly-2.27.0.min.js"></script>
    <style>
        * { box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            margin: 0;
            padding: 20px;
            background: #f5f5f5;
        }
        h1 { text-align: center; color: #333; margin-bottom: 20px; }
        .controls {
            background: white;
            padding: 15px;
            border-radius: 8px;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
            margin-bottom: 20px;
            display: flex;
            gap: 20px;
            align-items: flex-start;
            flex-wrap: wrap;
        }
        .control-group { flex: 1; min-width: 260px; }
        label { font-weight: 600; display: block; margin-bottom: 5px; color: #555; }
        input[type=text], select {
            width: 100%;
            padding: 8px;
            border: 1px solid #ddd;
            border-radius: 4px;
            font-size: 14px;
        }
        select[multiple] { min-height: 150px; }
        .row { display: flex; gap: 10px; align-items: center; margin-bottom: 10px; }
        .row input[type=range] { flex: 1; }
        .row input[type=number] { width: 80px; padding: 6px; }
        .buttons { display: flex; gap: 10px; flex-wrap: wrap; margin: 10px 0; }
        button {
            padding: 8px 16px;
            border: none;
            border-radius: 4px;
            cursor: pointer;
            font-size: 14px;
        }
        button:disabled { opacity: 0.5; cursor: default; }
        .btn-success { background: #28a745; color: white; }
        .btn-secondary { background: #6c757d; color: white; }
        .btn-warning { background: #ffc107; color: #333; }
        #chart {
            background: white;
            border-radius: 8px;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
            height: 65vh;
            min-height: 450px;
        }
        .status { color: #666; font-size: 14px; }
    </style>
</head>
<body>
    <h1>Damage Timeline</h1>

    <div class="controls">
        <div class="control-group">
            <label for="apiUrl">API server address:</label>
            <input type="text" id="apiUrl" placeholder="http://127.0.0.1:8080">
            <div class="buttons">
                <button class="btn-success" id="startBtn" onclick="send({type: 'start'})">Start</button>
                <button class="btn-secondary" id="stopBtn" onclick="send({type: 'stop'})" disabled>Stop</button>
                <button class="btn-warning" onclick="send({type: 'clear'})">Clear statistics</button>
            </div>
            <div class="status" id="status">Connecting...</div>
        </div>
        <div class="control-group">
            <label for="bucketRange">Bucket width (seconds):</label>
            <div class="row">
                <input type="range" id="bucketRange">
                <input type="number" id="bucketNumber">
            </div>
            <label for="zoneSelect">Display time zone:</label>
            <select id="zoneSelect"></select>
        </div>
        <div class="control-group">
            <label for="playerSelect">Players (Ctrl/Cmd+click for multiple):</label>
            <select id="playerSelect" multiple></select>
            <div class="row">
                <input type="checkbox" id="autoInclude">
                <label for="autoInclude" style="margin: 0; font-weight: normal;">Automatically include new players</label>
            </div>
        </div>
    </div>

    <div id="chart"></div>

    <script>
        let ws = null;

        function send(message) {
            if (message.type === 'start' || message.type === 'clear') {
                pushParams({api_url: document.getElementById('apiUrl').value});
            }
            if (ws && ws.readyState === WebSocket.OPEN) {
                ws.send(JSON.stringify(message));
            }
        }

        function pushParams(update) {
            if (ws && ws.readyState === WebSocket.OPEN) {
                ws.send(JSON.stringify(Object.assign({type: 'set_params'}, update)));
            }
        }

        function applyDefaults(defaults, zones) {
            document.getElementById('apiUrl').value = defaults.api_url || '';
            for (const id of ['bucketRange', 'bucketNumber']) {
                const input = document.getElementById(id);
                input.min = defaults.min_bucket_secs;
                input.max = defaults.max_bucket_secs;
                input.step = defaults.bucket_step_secs;
                input.value = defaults.bucket_secs;
            }
            const zoneSelect = document.getElementById('zoneSelect');
            zoneSelect.innerHTML = '';
            for (const zone of zones) {
                const option = document.createElement('option');
                option.value = zone.value;
                option.textContent = zone.label;
                zoneSelect.appendChild(option);
            }
            zoneSelect.value = defaults.time_zone;
            document.getElementById('autoInclude').checked = defaults.auto_include;
        }

        function applyRender(update) {
            Plotly.react('chart', update.figure.data, update.figure.layout, {responsive: true});

            const playerSelect = document.getElementById('playerSelect');
            const selected = new Set(update.selected);
            playerSelect.innerHTML = '';
            for (const player of update.players) {
                const option = document.createElement('option');
                option.value = player.id;
                option.textContent = player.name;
                option.selected = selected.has(player.id);
                playerSelect.appendChild(option);
            }

            document.getElementById('bucketRange').value = update.bucket_secs;
            document.getElementById('bucketNumber').value = update.bucket_secs;
            document.getElementById('zoneSelect').value = update.time_zone;
            document.getElementById('autoInclude').checked = update.auto_include;
            document.getElementById('startBtn').disabled = update.running;
            document.getElementById('stopBtn').disabled = !update.running;
            document.getElementById('status').textContent = update.status;
        }

        function connect() {
            const scheme = location.protocol === 'https:' ? 'wss' : 'ws';
            ws = new WebSocket(`${scheme}://${location.host}/ws`);

            ws.onmessage = (event) => {
                const message = JSON.parse(event.data);
                switch (message.type) {
                    case 'connected':
                        applyDefaults(message.defaults, message.time_zones);
                        break;
                    case 'render':
                        applyRender(message);
                        break;
                    case 'error':
                        document.getElementById('status').textContent = message.message;
                        break;
                }
            };

            ws.onclose = () => {
                document.getElementById('status').textContent = 'Disconnected, reconnecting...';
                setTimeout(connect, 2000);
            };
        }

        document.getElementById('bucketRange').addEventListener('change', (e) => {
            pushParams({bucket_secs: parseFloat(e.target.value)});
        });
        document.getElementById('bucketNumber').addEventListener('change', (e) => {
            pushParams({bucket_secs: parseFloat(e.target.value)});
        });
        document.getElementById('zoneSelect').addEventListener('change', (e) => {
            pushParams({time_zone: e.target.value});
        });
        document.getElementById('playerSelect').addEventListener('change', (e) => {
            const selected = Array.from(e.target.selectedOptions).map(o => o.value);
            pushParams({selected: selected, auto_include: false});
        });
        document.getElementById('autoInclude').addEventListener('change', (e) => {
            pushParams({auto_include: e.target.checked});
        });
        document.getElementById('apiUrl').addEventListener('change', (e) => {
            pushParams({api_url: e.target.value});
        });

        connect();
    </script>
</body>
</html>
"##;
