use chrono::NaiveDate;

pub fn render_index(today: NaiveDate) -> String {
    INDEX_HTML.replace("{{TODAY}}", &today.format("%Y-%m-%d").to_string())
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Heatmap Tracker</title>
  <style>
    :root {
      --ink: #1f2328;
      --muted: #656d76;
      --line: #d0d7de;
      --panel: #ffffff;
      --page: #f6f8fa;
      --l0: #ebedf0;
      --l1: #c6e48b;
      --l2: #9be9a8;
      --l3: #40c463;
      --l4: #30a14e;
      --l5: #216e39;
    }

    * { box-sizing: border-box; }

    body {
      margin: 0;
      font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif;
      color: var(--ink);
      background: var(--page);
    }

    header {
      display: flex;
      justify-content: space-between;
      align-items: center;
      padding: 16px 24px;
      background: var(--panel);
      border-bottom: 1px solid var(--line);
    }

    header h1 { margin: 0; font-size: 1.4rem; }
    header p { margin: 2px 0 0; color: var(--muted); font-size: 0.9rem; }

    button, input {
      font: inherit;
      border: 1px solid var(--line);
      border-radius: 6px;
      padding: 6px 10px;
      background: var(--panel);
    }

    button { cursor: pointer; }
    button.primary { background: var(--l4); border-color: var(--l4); color: #fff; }

    .layout { display: flex; min-height: calc(100vh - 74px); }

    aside {
      width: 280px;
      padding: 20px;
      background: var(--panel);
      border-right: 1px solid var(--line);
      display: grid;
      align-content: start;
      gap: 16px;
    }

    .topic {
      padding: 10px 12px;
      border-radius: 8px;
      border: 1px solid transparent;
      cursor: pointer;
      display: flex;
      justify-content: space-between;
    }

    .topic.active { border-color: var(--l2); background: #f0fff4; }
    .topic small { color: var(--muted); display: block; }

    main { flex: 1; padding: 24px; overflow-x: auto; }

    .grid {
      display: grid;
      grid-auto-flow: column;
      grid-template-rows: repeat(7, 12px);
      grid-auto-columns: 12px;
      gap: 3px;
      padding: 16px;
      background: var(--panel);
      border: 1px solid var(--line);
      border-radius: 8px;
      width: max-content;
    }

    .cell { width: 12px; height: 12px; border-radius: 2px; cursor: pointer; }
    .cell:hover { outline: 2px solid var(--l3); }
    .legend { display: flex; gap: 4px; align-items: center; color: var(--muted); font-size: 0.8rem; }
    .legend .cell { cursor: default; }

    .stats {
      display: grid;
      grid-template-columns: repeat(4, minmax(120px, 1fr));
      gap: 12px;
      margin-top: 20px;
    }

    .stat {
      background: var(--panel);
      border: 1px solid var(--line);
      border-radius: 8px;
      padding: 14px;
    }

    .stat strong { display: block; font-size: 1.5rem; }
    .stat span { color: var(--muted); font-size: 0.85rem; }

    #status { min-height: 1.2em; font-size: 0.9rem; }
    #status.error { color: #cf222e; }
    #status.ok { color: var(--l4); }

    .hidden { display: none; }
  </style>
</head>
<body>
  <header>
    <div>
      <h1>Heatmap Tracker</h1>
      <p>Track your daily progress across different areas</p>
    </div>
    <div>
      <input id="import-file" type="file" accept=".json,application/json" class="hidden" />
      <button id="import-btn">Import JSON</button>
      <a href="/api/export" download><button>Export JSON</button></a>
    </div>
  </header>

  <div class="layout">
    <aside>
      <div id="topics"></div>
      <form id="create-form">
        <input id="new-name" placeholder="Topic name" required />
        <input id="new-unit" placeholder="Unit (e.g. hours)" required />
        <button class="primary" type="submit">Add topic</button>
      </form>
      <form id="quick-form">
        <input id="quick-date" type="date" value="{{TODAY}}" required />
        <input id="quick-value" type="number" min="0" step="0.1" placeholder="Value" required />
        <button class="primary" type="submit">Quick add</button>
      </form>
      <div id="status" role="status"></div>
    </aside>

    <main>
      <div id="empty" class="hidden">
        <h2>No topics available</h2>
        <p>Import existing data or create your first topic to get started.</p>
      </div>
      <div id="view" class="hidden">
        <h2 id="title"></h2>
        <div class="legend">
          <span id="summary"></span>
          <span style="margin-left:auto">Less</span>
          <div class="cell" style="background:var(--l0)"></div>
          <div class="cell" style="background:var(--l1)"></div>
          <div class="cell" style="background:var(--l2)"></div>
          <div class="cell" style="background:var(--l3)"></div>
          <div class="cell" style="background:var(--l4)"></div>
          <div class="cell" style="background:var(--l5)"></div>
          <span>More</span>
        </div>
        <div id="grid" class="grid"></div>
        <div class="stats">
          <div class="stat"><strong id="stat-total">0</strong><span>Total</span></div>
          <div class="stat"><strong id="stat-week">0</strong><span>This week</span></div>
          <div class="stat"><strong id="stat-today">0</strong><span>Today</span></div>
          <div class="stat"><strong id="stat-streak">0</strong><span>Current streak</span></div>
        </div>
        <p><button id="delete-btn">Delete topic</button></p>
      </div>
    </main>
  </div>

  <script>
    const today = '{{TODAY}}';
    let topics = [];
    let weekTotals = new Map();
    let currentId = null;

    const statusEl = document.getElementById('status');
    const setStatus = (message, tone) => {
      statusEl.textContent = message;
      statusEl.className = tone || '';
      if (tone === 'ok') {
        setTimeout(() => setStatus('', ''), 1500);
      }
    };

    const request = async (url, options) => {
      const res = await fetch(url, options);
      if (!res.ok) {
        let message = 'Request failed';
        try {
          message = (await res.json()).message || message;
        } catch (_) {}
        throw new Error(message);
      }
      return res.status === 204 ? null : res.json();
    };

    const renderTopics = () => {
      const list = document.getElementById('topics');
      list.innerHTML = '';
      topics.forEach((topic) => {
        const item = document.createElement('div');
        item.className = 'topic' + (topic.id === currentId ? ' active' : '');
        item.innerHTML = '<div><b></b><small></small></div><span></span>';
        item.querySelector('b').textContent = topic.name;
        item.querySelector('small').textContent = topic.unit;
        const week = weekTotals.get(topic.id) || 0;
        item.querySelector('span').textContent = week + ' ' + topic.unit.charAt(0);
        item.addEventListener('click', () => {
          currentId = topic.id;
          render().catch((err) => setStatus(err.message, 'error'));
        });
        list.appendChild(item);
      });
    };

    const renderHeatmap = async () => {
      const topic = topics.find((t) => t.id === currentId);
      document.getElementById('empty').classList.toggle('hidden', Boolean(topic));
      document.getElementById('view').classList.toggle('hidden', !topic);
      if (!topic) {
        return;
      }

      const view = await request(`/api/topics/${topic.id}/heatmap?today=${today}`);
      document.getElementById('title').textContent = `${topic.name} Progress`;
      document.getElementById('summary').textContent =
        `${view.stats.total_all_time} ${topic.unit} recorded`;

      const grid = document.getElementById('grid');
      grid.innerHTML = '';
      view.cells.forEach((cell) => {
        const el = document.createElement('div');
        el.className = 'cell';
        el.style.background = `var(--l${cell.level})`;
        el.title = cell.value === 0
          ? `No data on ${cell.date}`
          : `${cell.value} ${topic.unit} on ${cell.date}`;
        el.addEventListener('click', () => editCell(topic, cell));
        grid.appendChild(el);
      });

      document.getElementById('stat-total').textContent = view.stats.total_all_time;
      document.getElementById('stat-week').textContent = view.stats.total_this_week;
      document.getElementById('stat-today').textContent = view.stats.today_value;
      document.getElementById('stat-streak').textContent = view.stats.current_streak;
    };

    const render = async () => {
      renderTopics();
      await renderHeatmap();
    };

    const refresh = async () => {
      const [list, summaries] = await Promise.all([
        request('/api/topics'),
        request(`/api/summaries?today=${today}`)
      ]);
      topics = list;
      weekTotals = new Map(summaries.map((s) => [s.id, s.stats.total_this_week]));
      if (!topics.some((t) => t.id === currentId)) {
        currentId = topics.length > 0 ? topics[0].id : null;
      }
      await render();
    };

    const saveEntry = async (topicId, date, value) => {
      await request(`/api/topics/${topicId}/entries/${date}`, {
        method: 'PUT',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({ value })
      });
      await refresh();
      setStatus('Entry updated', 'ok');
    };

    const editCell = (topic, cell) => {
      const input = prompt(`Value for ${cell.date} (${topic.unit})`, String(cell.value));
      if (input === null) {
        return;
      }
      const value = parseFloat(input);
      if (Number.isNaN(value) || value < 0) {
        setStatus('Enter a non-negative number', 'error');
        return;
      }
      saveEntry(topic.id, cell.date, value).catch((err) => setStatus(err.message, 'error'));
    };

    document.getElementById('quick-form').addEventListener('submit', (event) => {
      event.preventDefault();
      if (!currentId) {
        return;
      }
      const date = document.getElementById('quick-date').value;
      const value = parseFloat(document.getElementById('quick-value').value);
      if (!date || Number.isNaN(value) || value < 0) {
        setStatus('Enter a date and a non-negative number', 'error');
        return;
      }
      saveEntry(currentId, date, value)
        .then(() => { document.getElementById('quick-value').value = ''; })
        .catch((err) => setStatus(err.message, 'error'));
    });

    document.getElementById('create-form').addEventListener('submit', (event) => {
      event.preventDefault();
      const name = document.getElementById('new-name').value.trim();
      const unit = document.getElementById('new-unit').value.trim();
      request('/api/topics', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({ name, unit })
      })
        .then(async (topic) => {
          currentId = topic.id;
          event.target.reset();
          await refresh();
          setStatus('Topic created', 'ok');
        })
        .catch((err) => setStatus(err.message, 'error'));
    });

    document.getElementById('delete-btn').addEventListener('click', () => {
      if (topics.length <= 1) {
        setStatus('Cannot delete the last topic', 'error');
        return;
      }
      request(`/api/topics/${currentId}`, { method: 'DELETE' })
        .then(async () => {
          currentId = null;
          await refresh();
          setStatus('Topic deleted', 'ok');
        })
        .catch((err) => setStatus(err.message, 'error'));
    });

    const fileInput = document.getElementById('import-file');
    document.getElementById('import-btn').addEventListener('click', () => fileInput.click());
    fileInput.addEventListener('change', () => {
      const file = fileInput.files[0];
      if (!file) {
        return;
      }
      const form = new FormData();
      form.append('file', file);
      request('/api/import', { method: 'POST', body: form })
        .then(async (result) => {
          currentId = result.topics.length > 0 ? result.topics[0].id : null;
          await refresh();
          setStatus(`Imported ${result.topics.length} topics`, 'ok');
        })
        .catch((err) => setStatus(err.message, 'error'))
        .finally(() => { fileInput.value = ''; });
    });

    refresh().catch((err) => setStatus(err.message, 'error'));
  </script>
</body>
</html>
"#;
